//! Command implementations for the CLI tool.

use std::path::Path;

use unipkg::{Guid, Package};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;

/// List command implementation
pub fn list(package_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let package = match open_package(package_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    print!("{}", formatter.format_list(&mut package.assets()));
    ExitCode::Success
}

/// Rename command implementation
pub fn rename(
    package_path: &Path,
    from: &str,
    to: &str,
    output: Option<&Path>,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let mut package = match open_package(package_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    match package.rename(from, to) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Error: no asset at '{}'", from);
            return ExitCode::NotFound;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    }

    if let Err(code) = save_package(&package, output.unwrap_or(package_path)) {
        return code;
    }
    print!("{}", formatter.format_rename(from, to));
    ExitCode::Success
}

/// Replace-guid command implementation
pub fn replace_guid(
    package_path: &Path,
    asset_path: &str,
    guid: Option<&str>,
    output: Option<&Path>,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let new_guid = match guid.map(Guid::parse).transpose() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let mut package = match open_package(package_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let change = match package.replace_guid(asset_path, new_guid) {
        Ok(Some(change)) => change,
        Ok(None) => {
            eprintln!("Error: no asset at '{}'", asset_path);
            return ExitCode::NotFound;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if let Err(code) = save_package(&package, output.unwrap_or(package_path)) {
        return code;
    }
    print!("{}", formatter.format_guid_change(asset_path, &change));
    ExitCode::Success
}

/// Refs command implementation
pub fn refs(package_path: &Path, guid: &str, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let guid = match Guid::parse(guid) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let package = match open_package(package_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let paths = package.find_references(&guid);
    print!("{}", formatter.format_refs(guid.as_str(), &paths));
    ExitCode::Success
}

fn open_package(path: &Path) -> Result<Package, ExitCode> {
    let bytes = std::fs::read(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        ExitCode::IoError
    })?;
    Package::import(&bytes).map_err(|e| {
        eprintln!("Error opening package: {}", e);
        error_to_exit_code(&e)
    })
}

fn save_package(package: &Package, path: &Path) -> Result<(), ExitCode> {
    let bytes = package.export().map_err(|e| {
        eprintln!("Error encoding package: {}", e);
        error_to_exit_code(&e)
    })?;
    std::fs::write(path, bytes).map_err(|e| {
        eprintln!("Error writing {}: {}", path.display(), e);
        ExitCode::IoError
    })
}
