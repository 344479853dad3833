//! `call <method>`: one-shot invocation printing the result envelope.

use serde_json::{Map, Value};
use tracing::debug;

use chromaplay_core::{ApiClient, Command, CoreError, registry};

use crate::cli::{CallArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    args: CallArgs,
    client: &ApiClient,
    global: &GlobalOpts,
    profile_name: &str,
) -> Result<(), CliError> {
    let method = registry::by_id(&args.method)
        .ok_or_else(|| CoreError::UnknownMethod(args.method.clone()))?;

    let params = match (args.params, args.from_file) {
        (Some(text), _) => serde_json::from_str(&text)?,
        (None, Some(path)) => util::read_json_file(&path)?,
        (None, None) => Value::Object(Map::new()),
    };

    // Decode up front so bad parameters are a usage error, not an API failure.
    let command = Command::from_method(method.id, params)?;

    if method.is_destructive() {
        let prompt = format!("{} permanently deletes data. Continue?", method.id);
        if !util::confirm(&prompt, method.id.as_str(), global.yes)? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    if let Some(ref name) = args.collection {
        let selected = client.select_collection(name).await;
        if !selected.success {
            return Err(CliError::from_call(&selected, "getCollection", profile_name));
        }
        debug!(collection = %name, "selected collection");
    }

    let pb = util::spinner(global, &format!("Calling {}...", method.id));
    let result = client.execute(command).await;
    pb.finish_and_clear();

    let color = output::should_color(global.color_mode());
    let out = output::render_result(global.format(), &result, color);

    if result.success {
        output::print_output(&out, global.quiet);
        Ok(())
    } else {
        // Structured formats still get the envelope on stdout.
        if global.format() != OutputFormat::Table {
            output::print_output(&out, global.quiet);
        }
        Err(CliError::from_call(&result, method.id.as_str(), profile_name))
    }
}
