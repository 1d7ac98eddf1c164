//! Compilation units: the boundary at which errors stop propagating.

use crate::{awst::Expression, context::CompileContext, types::TypeRegistry};

use std::{fs, path::PathBuf, sync::Arc};

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
    warning::CompileWarning,
};

/// What a single unit produced.
#[derive(Debug)]
pub struct UnitOutcome {
    pub name: String,
    pub ok: bool,
    pub expression: Option<Arc<Expression>>,
    pub errors: Vec<CompileError>,
    pub warnings: Vec<CompileWarning>,
}

/// Runs `build` for the unit `name`.
///
/// Diagnostics emitted by `build` are returned in the outcome and also recorded in the context's
/// handler. A failed unit does not affect units compiled after it.
pub fn compile_unit<F>(ctx: &CompileContext, name: &str, build: F) -> UnitOutcome
where
    F: FnOnce(&Handler, &TypeRegistry) -> Result<Arc<Expression>, ErrorEmitted>,
{
    tracing::debug!("Building AWST for {name}");
    let (result, errors, warnings) = ctx.handler.scope(|handler| {
        let expression = build(handler, &ctx.types)?;
        if ctx.options.get_output_awst() {
            write_awst(ctx, handler, name, &expression)?;
        }
        Ok(expression)
    });
    for warning in &warnings {
        tracing::warn!("{}", ctx.render_warning(warning));
    }
    for error in &errors {
        tracing::error!("{}", ctx.render(error));
    }
    let expression = result.ok();
    if expression.is_some() {
        tracing::debug!("{name} built");
    } else {
        tracing::debug!("{name} failed with {} error(s)", errors.len());
    }
    UnitOutcome {
        name: name.to_string(),
        ok: expression.is_some(),
        expression,
        errors,
        warnings,
    }
}

/// Compiles every unit in order, continuing past failures.
pub fn compile_units<I, F>(ctx: &CompileContext, units: I) -> Vec<UnitOutcome>
where
    I: IntoIterator<Item = (String, F)>,
    F: FnOnce(&Handler, &TypeRegistry) -> Result<Arc<Expression>, ErrorEmitted>,
{
    units
        .into_iter()
        .map(|(name, build)| compile_unit(ctx, &name, build))
        .collect()
}

fn write_awst(
    ctx: &CompileContext,
    handler: &Handler,
    name: &str,
    expression: &Expression,
) -> Result<(), ErrorEmitted> {
    let out_dir = ctx
        .options
        .get_out_dir()
        .map(|dir| PathBuf::clone(&dir))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = out_dir.join(format!("{name}.awst.json"));
    let failed = |message: String| {
        handler.emit_err(CompileError::internal(
            format!("could not write {}: {message}", path.display()),
            Some(expression.source_location.clone()),
        ))
    };
    let json = expression.to_json().map_err(|err| failed(err.to_string()))?;
    fs::create_dir_all(&out_dir).map_err(|err| failed(err.to_string()))?;
    tracing::info!("Writing {}", path.display());
    fs::write(&path, json).map_err(|err| failed(err.to_string()))
}
