pub mod bell;
pub mod breath;
pub mod config;
pub mod guidance;
pub mod intention;
pub mod mixer;
pub mod mood;
pub mod streak;
pub mod topics;

use std::path::PathBuf;

use serde::Serialize;
use stillwater_core::ambient::DirSampleLoader;
use stillwater_core::storage::{data_dir, AmbientConfig};
use stillwater_core::DynPreferences;

/// Every command error funnels into `CoreError`; `main` prints it.
pub type CmdResult = stillwater_core::error::Result<()>;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One compact JSON document per line, for event streams.
pub(crate) fn print_line<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub(crate) fn open_prefs() -> DynPreferences {
    DynPreferences::open_default()
}

/// Samples come from `ambient.samples_dir`, else `<data_dir>/samples`.
pub(crate) fn sample_loader(config: &AmbientConfig) -> DirSampleLoader {
    let dir = config
        .samples_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| data_dir().ok().map(|d| d.join("samples")))
        .unwrap_or_else(|| PathBuf::from("samples"));
    DirSampleLoader::new(dir)
}
