use crate::classify::ImageCategory;

/// File-name keywords, checked in order against the lowercased name.
pub const FILE_NAME_KEYWORDS: &[(&str, ImageCategory)] = &[
    ("mockup", ImageCategory::Mockup),
    ("wireframe", ImageCategory::Wireframe),
    ("diagram", ImageCategory::Diagram),
    ("screenshot", ImageCategory::Screenshot),
];

/// Asset-type spellings seen in design hand-off sheets. Wireframe terms come
/// first so "wireframe design" is not read as a mockup.
const ASSET_TYPE_KEYWORDS: &[(&str, ImageCategory)] = &[
    ("wireframe", ImageCategory::Wireframe),
    ("wire frame", ImageCategory::Wireframe),
    ("lo-fi", ImageCategory::Wireframe),
    ("low fidelity", ImageCategory::Wireframe),
    ("sketch", ImageCategory::Wireframe),
    ("screenshot", ImageCategory::Screenshot),
    ("screen shot", ImageCategory::Screenshot),
    ("screen capture", ImageCategory::Screenshot),
    ("diagram", ImageCategory::Diagram),
    ("flowchart", ImageCategory::Diagram),
    ("user flow", ImageCategory::Diagram),
    ("sitemap", ImageCategory::Diagram),
    ("architecture", ImageCategory::Diagram),
    ("mockup", ImageCategory::Mockup),
    ("mock-up", ImageCategory::Mockup),
    ("mock up", ImageCategory::Mockup),
    ("hi-fi", ImageCategory::Mockup),
    ("high fidelity", ImageCategory::Mockup),
    ("prototype", ImageCategory::Mockup),
    ("ui design", ImageCategory::Mockup),
    ("visual design", ImageCategory::Mockup),
];

/// Category implied by a declared asset type, e.g. "Hi-fi Mockup" -> mockup.
pub fn asset_type_category(asset_type: &str) -> Option<ImageCategory> {
    let lower = asset_type.to_lowercase();
    ASSET_TYPE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(*keyword))
        .map(|(_, category)| *category)
}
