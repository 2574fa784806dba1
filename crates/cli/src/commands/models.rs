//! `pico --list-models` — print the model catalog.

use std::io::Write;

use pico_core::model::ModelCatalog;

pub fn run(catalog: &ModelCatalog, out: &mut impl Write) -> std::io::Result<()> {
    for provider in catalog.list_providers() {
        writeln!(out, "{provider}")?;
        for model in catalog.list_models(provider) {
            writeln!(
                out,
                "  {:<16} {:<20} api={} reasoning={} max_tokens={}",
                model.id, model.name, model.api, model.reasoning, model.max_tokens
            )?;
        }
    }
    Ok(())
}
