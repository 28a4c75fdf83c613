use miette::Result;
use serde::Serialize;

use super::OUTPUT_SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct VersionJson {
    schema_version: u32,
    name: &'static str,
    version: &'static str,
}

pub fn version_string() -> String {
    format!("typestrip {VERSION}")
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let out = VersionJson {
            schema_version: OUTPUT_SCHEMA_VERSION,
            name: "typestrip",
            version: VERSION,
        };
        println!("{}", serde_json::to_string(&out).unwrap_or_default());
    } else {
        println!("{}", version_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_contains_version() {
        let vs = version_string();
        assert!(vs.contains(VERSION));
        assert!(vs.starts_with("typestrip "));
    }
}
