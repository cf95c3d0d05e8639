//! Console rendition of the upload-then-ask workflow: resolve the
//! configured store, import each file given on the command line, then print
//! the answer to a question.

use std::path::Path;

use anyhow::{bail, Context};
use common::utils::config::get_config;
use file_search::{
    answer_query, resolve_or_create_store, upload_and_wait, FileSearchClient, ImportPolicy,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (files, question) = split_args(&args);
    if files.is_empty() {
        bail!("usage: demo <file>... [-- <question>]");
    }

    let config = get_config()?;
    let client = FileSearchClient::from_config(&config)?;
    let policy = ImportPolicy::from_config(&config);

    let store_id = resolve_or_create_store(&client, &config.store_display_name).await?;

    for path in &files {
        let display_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string();
        let payload = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {path}"))?;

        info!(file = %display_name, "uploading");
        let receipt =
            upload_and_wait(&client, &store_id, payload.into(), &display_name, &policy).await?;
        info!(file = %receipt.file, store = %receipt.store, "import finished");
    }

    let question =
        question.unwrap_or_else(|| "Tell me about these documents".to_string());
    let answer = answer_query(&client, std::slice::from_ref(&store_id), &question).await?;
    println!("{answer}");

    Ok(())
}

/// Arguments before `--` are file paths; everything after is the question.
fn split_args(args: &[String]) -> (Vec<String>, Option<String>) {
    match args.iter().position(|arg| arg == "--") {
        Some(split) => {
            let files = args.get(..split).unwrap_or_default().to_vec();
            let question = args
                .get(split.saturating_add(1)..)
                .filter(|rest| !rest.is_empty())
                .map(|rest| rest.join(" "));
            (files, question)
        }
        None => (args.to_vec(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn splits_files_from_question() {
        let (files, question) = split_args(&strings(&["a.pdf", "b.pdf", "--", "What", "happened?"]));
        assert_eq!(files, strings(&["a.pdf", "b.pdf"]));
        assert_eq!(question.as_deref(), Some("What happened?"));
    }

    #[test]
    fn no_separator_means_no_question() {
        let (files, question) = split_args(&strings(&["a.pdf"]));
        assert_eq!(files, strings(&["a.pdf"]));
        assert!(question.is_none());
    }

    #[test]
    fn trailing_separator_means_no_question() {
        let (files, question) = split_args(&strings(&["a.pdf", "--"]));
        assert_eq!(files, strings(&["a.pdf"]));
        assert!(question.is_none());
    }
}
