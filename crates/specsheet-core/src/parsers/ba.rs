//! Business-analysis workbooks: product overview, stories, criteria, value, sign-off.

use crate::parsers::{upper_text, TemplateOutput, PENDING};
use crate::templates::schema::TemplateDef;

const STATUSES: [&str; 3] = ["APPROVED", "REJECTED", PENDING];

pub(crate) fn enrich(def: &TemplateDef, output: &mut TemplateOutput) {
    output.approval_status = def
        .sheet("BA Approval")
        .zip(output.key_values("ba_approval"))
        .and_then(|(sheet, fields)| upper_text(fields, sheet, "status"))
        .filter(|s| STATUSES.contains(&s.as_str()))
        .unwrap_or_else(|| PENDING.to_string());

    let total_us = output.section_len("user_stories");
    let total_ac = output.section_len("acceptance_criteria");
    let total_bv = output.section_len("business_values");
    let has_approval = output.section_len("ba_approval") > 0;

    let stats = &mut output.stats;
    stats.set("total_us", total_us);
    stats.set("total_ac", total_ac);
    stats.set("total_bv", total_bv);
    stats.set("total_images", 0usize);
    stats.set("has_ba_approval", has_approval);
    stats.set("has_images", false);
    stats.set("template_type", def.kind.as_str());
}
