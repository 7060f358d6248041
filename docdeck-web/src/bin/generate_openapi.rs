//! Generate the OpenAPI specification
//!
//! Prints the JSON document to stdout, or writes `openapi.json` into the
//! directory given as the first argument.

use docdeck_web::openapi::get_openapi_json;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json = get_openapi_json()?;

    match std::env::args().nth(1).map(PathBuf::from) {
        Some(docs_dir) => {
            fs::create_dir_all(&docs_dir)?;
            let json_path = docs_dir.join("openapi.json");
            fs::write(&json_path, json)?;
            eprintln!("Generated: {}", json_path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
