use alchemy_application::FusionService;
use alchemy_core::catalog;
use anyhow::{Context, Result};

use crate::render;

pub async fn run(
    service: &FusionService,
    first: &str,
    second: &str,
    json: bool,
    strict: bool,
) -> Result<()> {
    let first = catalog::resolve(first)?;
    let second = catalog::resolve(second)?;

    let result = if strict {
        service
            .try_fuse(&first, &second)
            .await
            .context("Fusion failed")?
    } else {
        service.fuse(&first, &second).await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render::pair(&first, &second));
        println!("{}", render::result_card(&result));
    }
    Ok(())
}
