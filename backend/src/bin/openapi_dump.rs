//! Print the OpenAPI document as pretty JSON on stdout.
//!
//! Used by CI and client generators: `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use backend::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
