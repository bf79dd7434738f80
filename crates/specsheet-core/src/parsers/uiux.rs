//! Design hand-off workbooks: overview, Figma links, assets, decisions, approval.

use crate::model::{Fields, ParsedSection, Scalar};
use crate::parsers::{lower_text, stamp_approval, upper_text, TemplateOutput};
use crate::templates::schema::{SheetDef, TemplateDef};

const IMAGE_TYPES: [&str; 5] = ["PNG", "JPG", "JPEG", "GIF", "SVG"];
const DESIGN_FILE_TYPES: [&str; 4] = ["FIG", "SKETCH", "PSD", "AI"];
const SEPARATE_UPLOAD_KEYWORDS: [&str; 5] = ["screenshot", "mockup", "prototype", "design", "wireframe"];

pub(crate) fn enrich(def: &TemplateDef, output: &mut TemplateOutput) {
    if let (Some(sheet), Some(assets)) = (def.sheet("Design Assets"), output.table_mut("design_assets")) {
        for asset in assets.iter_mut() {
            flag_asset(asset, sheet);
        }
    }

    let needing_upload: Vec<Fields> = output
        .table("design_assets")
        .iter()
        .filter(|a| a.get("requires_separate_upload").and_then(Scalar::as_bool) == Some(true))
        .cloned()
        .collect();

    output.approval_status = stamp_approval(output, def, "approval", "UIUX");

    let total_figma = output.section_len("figma_links");
    let total_assets = output.section_len("design_assets");
    let total_decisions = output.section_len("design_decisions");
    let has_approval = output.section_len("approval") > 0;
    let assets_needing_upload = needing_upload.len();

    output.sections.insert(
        "assets_requiring_separate_upload",
        ParsedSection::Table(needing_upload),
    );

    let stats = &mut output.stats;
    stats.set("total_figma_links", total_figma);
    stats.set("total_design_assets", total_assets);
    stats.set("total_design_decisions", total_decisions);
    stats.set("total_images", 0usize);
    stats.set("assets_needing_upload", assets_needing_upload);
    stats.set("has_figma_links", total_figma > 0);
    stats.set("has_design_assets", total_assets > 0);
    stats.set("has_approval", has_approval);
    stats.set("has_images", false);
    stats.set("separate_asset_upload", assets_needing_upload > 0);
    stats.set("figma_integration", total_figma > 0);
    stats.set("template_type", def.kind.as_str());
}

/// Add `is_image`, `is_design_file` and `requires_separate_upload` to an asset record.
fn flag_asset(asset: &mut Fields, sheet: &SheetDef) {
    let file_type = upper_text(asset, sheet, "file_type").unwrap_or_default();
    let file_type = file_type.trim_start_matches('.');
    let is_image = IMAGE_TYPES.contains(&file_type);
    let is_design_file = DESIGN_FILE_TYPES.contains(&file_type);

    let name = lower_text(asset, sheet, "asset_name");
    let requires_upload = SEPARATE_UPLOAD_KEYWORDS.iter().any(|k| name.contains(*k));

    asset.insert("is_image", Scalar::Bool(is_image));
    asset.insert("is_design_file", Scalar::Bool(is_design_file));
    asset.insert("requires_separate_upload", Scalar::Bool(requires_upload));
}

#[cfg(test)]
mod tests {
    use crate::model::Scalar;
    use crate::options::ParseOptions;
    use crate::parsers::parse_for_kind;
    use crate::parsers::test_support::sheet;
    use crate::templates::TemplateKind;
    use crate::warnings::Warnings;

    fn parse(sheets: Vec<crate::extraction::RawSheet>) -> crate::parsers::TemplateOutput {
        let mut w = Warnings::new();
        parse_for_kind(TemplateKind::Uiux, &sheets, &ParseOptions::default(), &mut w).unwrap()
    }

    #[test]
    fn test_asset_flags() {
        let out = parse(vec![sheet(
            "Design Assets",
            &[
                &["Asset Name", "Asset Type", "File Type"],
                &["Checkout Mockup", "Mockup", "png"],
                &["Icon set", "Icons", "FIG"],
                &["Readme", "Doc", ""],
            ],
        )]);
        let assets = out.table("design_assets");
        assert_eq!(assets[0].get("is_image"), Some(&Scalar::Bool(true)));
        assert_eq!(assets[0].get("requires_separate_upload"), Some(&Scalar::Bool(true)));
        assert_eq!(assets[1].get("is_design_file"), Some(&Scalar::Bool(true)));
        assert_eq!(assets[1].get("requires_separate_upload"), Some(&Scalar::Bool(false)));
        assert_eq!(assets[2].get("is_image"), Some(&Scalar::Bool(false)));

        let upload = out.table("assets_requiring_separate_upload");
        assert_eq!(upload.len(), 1);
        assert_eq!(upload[0].get("asset_name"), Some(&Scalar::from("Checkout Mockup")));
        assert_eq!(out.stats.count("assets_needing_upload"), Some(1));
        assert_eq!(out.stats.flag("separate_asset_upload"), Some(true));
    }

    #[test]
    fn test_figma_stats_and_ids() {
        let out = parse(vec![sheet(
            "Figma Links",
            &[
                &["Screen Name", "Figma URL"],
                &["Checkout", "https://www.figma.com/file/k3y/Checkout"],
            ],
        )]);
        let links = out.table("figma_links");
        assert_eq!(links[0].get("figma_file_id"), Some(&Scalar::from("k3y")));
        assert_eq!(out.stats.count("total_figma_links"), Some(1));
        assert_eq!(out.stats.flag("figma_integration"), Some(true));
        assert_eq!(out.category_name, "UIUX Design");
    }

    #[test]
    fn test_approval_stamped() {
        let out = parse(vec![sheet("Approval", &[&["Approver", "Sam"], &["Status", "Approved"]])]);
        let approval = out.key_values("approval").unwrap();
        assert_eq!(approval.get("approval_status"), Some(&Scalar::from("APPROVED")));
        assert_eq!(approval.get("division"), Some(&Scalar::from("UIUX")));
        assert_eq!(out.approval_status, "APPROVED");
    }

    #[test]
    fn test_empty_approval_not_stamped() {
        let out = parse(vec![]);
        assert!(out.key_values("approval").unwrap().is_empty());
        assert_eq!(out.approval_status, "PENDING");
        assert_eq!(out.stats.flag("has_approval"), Some(false));
    }
}
