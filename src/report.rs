use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;

use crate::{audit::BaseClassification, io_utils, plan};

pub const REPORT_FILE: &str = "formulas.json";
pub const PLAN_FILE: &str = "conversion_plan.txt";
pub const SQL_FILE: &str = "formula_conversion.sql";

/// Paths written by [`export`].
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub report: PathBuf,
    pub plan: PathBuf,
    pub sql: PathBuf,
}

/// Writes the JSON report, the conversion plan and the SQL template into
/// `dir`, creating it when needed.
pub fn export(dir: &Path, base: &BaseClassification) -> Result<ExportedReport> {
    fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
    let exported = ExportedReport {
        report: dir.join(REPORT_FILE),
        plan: dir.join(PLAN_FILE),
        sql: dir.join(SQL_FILE),
    };

    io_utils::write_json_pretty(&exported.report, base)?;
    info!("Detailed report saved: {:?}", exported.report);

    io_utils::write_text(&exported.plan, &plan::render_plan(base))?;
    info!("Conversion plan saved: {:?}", exported.plan);

    io_utils::write_text(&exported.sql, &plan::render_sql(base))?;
    info!("SQL template saved: {:?}", exported.sql);

    Ok(exported)
}

pub fn load_classification(path: &Path) -> Result<BaseClassification> {
    io_utils::read_json(path).with_context(|| format!("Loading classification report {path:?}"))
}
