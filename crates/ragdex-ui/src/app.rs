//! Interactive indexing console

use colored::*;
use std::path::PathBuf;

use ragdex_core::{Error, Result};

use crate::client::ApiClient;
use crate::console::{
    display_banner, print_failure, print_success, print_warning, prompt, prompt_multiline,
};
use crate::forms::{
    DEFAULT_FILE_CHUNK_SIZE, DEFAULT_TEXT_CHUNK_SIZE, check_upload, format_document, format_hit,
    format_index, parse_chunk_size, parse_top_k, required,
};

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateIndex,
    IndexText,
    IndexFile,
    Search,
    ListIndices,
    ViewContent,
    DeleteIndex,
    Quit,
}

impl Action {
    pub const MENU: [(Action, &'static str); 7] = [
        (Action::CreateIndex, "Create index"),
        (Action::IndexText, "Index text (chunked)"),
        (Action::IndexFile, "Upload file (txt, docx)"),
        (Action::Search, "Search"),
        (Action::ListIndices, "List indices"),
        (Action::ViewContent, "View index content"),
        (Action::DeleteIndex, "Delete index"),
    ];

    pub fn parse(choice: &str) -> Option<Action> {
        match choice.trim().to_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(Action::Quit),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Self::MENU.get(i))
                .map(|(action, _)| *action),
        }
    }
}

/// Run the menu loop until the user quits
pub async fn run(client: &ApiClient) -> Result<()> {
    display_banner(
        "ragdex - Document Indexing Console",
        &[
            "Create indices, ingest text and files, and search them.",
            "",
            format!("API: {}", client.base_url()).as_str(),
        ],
    );

    loop {
        print_menu();
        let choice = prompt("Choose")?;
        let Some(action) = Action::parse(&choice) else {
            print_warning("Pick a number from the menu or 'q' to quit.");
            continue;
        };
        if action == Action::Quit {
            break;
        }

        if let Err(e) = perform(client, action).await {
            match e {
                Error::InvalidInput(message) | Error::NotFound(message) => print_failure(&message),
                other => print_failure(&other.to_string()),
            }
        }
        println!();
    }

    Ok(())
}

fn print_menu() {
    for (i, (_, label)) in Action::MENU.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).green(), label);
    }
    println!("  {} Quit", "q.".green());
}

async fn perform(client: &ApiClient, action: Action) -> Result<()> {
    match action {
        Action::CreateIndex => {
            let name = prompt("Index name")?;
            let description = prompt("Description")?;
            let name = required("index name", &name)?;
            let description = required("description", &description)?;

            let response = client.create_index(name, description).await?;
            print_success(&response.message);
            println!("  description: {}", response.index_description.dimmed());
        }
        Action::IndexText => {
            let name = prompt("Target index")?;
            let description = prompt("Description")?;
            let content = prompt_multiline("Content")?;
            let chunk_size = prompt(&format!("Chunk size [{}]", DEFAULT_TEXT_CHUNK_SIZE))?;

            let name = required("index name", &name)?;
            let description = required("description", &description)?;
            let content = required("content", &content)?;
            let chunk_size = parse_chunk_size(&chunk_size, DEFAULT_TEXT_CHUNK_SIZE)?;

            let response = client
                .index_text(name, description, content, chunk_size)
                .await?;
            print_success(&response.message);
        }
        Action::IndexFile => {
            let name = prompt("Target index")?;
            let path = prompt("File path")?;
            let chunk_size = prompt(&format!("Chunk size [{}]", DEFAULT_FILE_CHUNK_SIZE))?;

            let name = required("index name", &name)?;
            let path = PathBuf::from(required("file path", &path)?);
            check_upload(&path)?;
            let chunk_size = parse_chunk_size(&chunk_size, DEFAULT_FILE_CHUNK_SIZE)?;

            let response = client.index_file(name, &path, chunk_size).await?;
            print_success(&response.message);
        }
        Action::Search => {
            let name = prompt("Index")?;
            let query = prompt("Query")?;
            let top_k = prompt("Results [3]")?;

            let name = required("index name", &name)?;
            let query = required("query", &query)?;
            let top_k = parse_top_k(&top_k)?;

            let hits = client.search(name, query, top_k).await?;
            if hits.is_empty() {
                print_warning("No results.");
            }
            for hit in &hits {
                println!("  {}", format_hit(hit).bold());
            }
        }
        Action::ListIndices => {
            let indices = client.list_indices().await?;
            if indices.is_empty() {
                print_warning("No indices.");
            }
            for summary in &indices {
                println!("  • {}", format_index(summary));
            }
        }
        Action::ViewContent => {
            let name = prompt("Index")?;
            let name = required("index name", &name)?;

            let content = client.index_content(name).await?;
            for document in &content.documents {
                println!("{}", format_document(document));
                println!("{}", "---".dimmed());
            }
            println!("{} documents in '{}'", content.documents.len(), content.index);
        }
        Action::DeleteIndex => {
            let name = prompt("Index to delete")?;
            let name = required("index name", &name)?;

            let response = client.delete_index(name).await?;
            print_success(&response.message);
        }
        Action::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choices() {
        assert_eq!(Action::parse("1"), Some(Action::CreateIndex));
        assert_eq!(Action::parse(" 7 "), Some(Action::DeleteIndex));
        assert_eq!(Action::parse("Q"), Some(Action::Quit));
        assert_eq!(Action::parse("0"), None);
        assert_eq!(Action::parse("8"), None);
        assert_eq!(Action::parse("search"), None);
    }
}
