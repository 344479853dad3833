//! `collections list` / `collections count`.

use tabled::Tabled;

use chromaplay_core::{ApiClient, Collection};

use crate::cli::{CollectionsArgs, CollectionsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CollectionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Metadata")]
    metadata: String,
}

impl From<&Collection> for CollectionRow {
    fn from(c: &Collection) -> Self {
        Self {
            name: c.name.clone(),
            id: c.id.clone(),
            metadata: c
                .metadata
                .as_ref()
                .filter(|m| !m.is_empty())
                .map(output::render_json_compact)
                .unwrap_or_default(),
        }
    }
}

pub async fn handle(
    args: &CollectionsArgs,
    client: &ApiClient,
    global: &GlobalOpts,
    profile_name: &str,
) -> Result<(), CliError> {
    match args.command {
        CollectionsCommand::List { limit, offset } => {
            let pb = util::spinner(global, "Listing collections...");
            let result = client.list_collections(limit, offset).await;
            pb.finish_and_clear();

            if !result.success {
                return Err(CliError::from_call(&result, "listCollections", profile_name));
            }
            let collections = result.data.unwrap_or_default();
            let out = output::render_list(global.format(), &collections, |c| CollectionRow::from(c), |c| {
                c.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
        CollectionsCommand::Count => {
            let result = client.count_collections().await;
            if !result.success {
                return Err(CliError::from_call(&result, "countCollections", profile_name));
            }
            let count = result.data.unwrap_or_default();
            let out = output::render_single(
                global.format(),
                &count,
                u64::to_string,
                u64::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
