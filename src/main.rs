use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use loreforge::{
    config::Config,
    embedding::{EmbeddingClient, OpenAiEmbeddingClient},
    ingest::{IngestService, PlainTextExtractor},
    logging,
    pinecone::PineconeService,
    retrieval::RetrievalService,
};
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "loreforge",
    version,
    about = "Manage the campaign knowledge base: ingest documents, query namespaces, administer the index."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a document, or every supported document in a directory, into a namespace.
    Ingest {
        /// File or directory to ingest.
        path: PathBuf,
        /// Target namespace (e.g. campaign-rules).
        #[arg(long)]
        namespace: String,
        /// Identifier prefix for vector ids; defaults to the file stem.
        #[arg(long)]
        doc_id_prefix: Option<String>,
    },
    /// Query a namespace and print the assembled context with raw matches.
    Query {
        /// Natural-language query text.
        query: String,
        /// Namespace to search.
        #[arg(long)]
        namespace: String,
        /// Number of nearest matches to fetch.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show per-namespace vector counts for the configured index.
    Stats,
    /// Delete every vector in one namespace. Other namespaces are untouched.
    DeleteNamespace {
        /// Namespace to clear.
        namespace: String,
    },
    /// Delete the configured index entirely. Irreversible.
    DeleteIndex {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    logging::init_tracing();

    let pinecone = Arc::new(PineconeService::new(&config)?);
    let embedding: Arc<dyn EmbeddingClient> = Arc::new(OpenAiEmbeddingClient::new(&config)?);

    match cli.command {
        Command::Ingest {
            path,
            namespace,
            doc_id_prefix,
        } => {
            let service = IngestService::new(
                config,
                Box::new(PlainTextExtractor::new()),
                embedding,
                pinecone,
            );
            ingest(&service, &path, &namespace, doc_id_prefix.as_deref()).await?;
            let snapshot = service.metrics_snapshot();
            println!(
                "Done: {} document(s), {} vector(s) upserted.",
                snapshot.documents_ingested, snapshot.vectors_upserted
            );
        }
        Command::Query {
            query,
            namespace,
            top_k,
        } => {
            let top_k = top_k.unwrap_or(config.retrieval_top_k);
            let max_chars = config.retrieval_max_context_chars;
            let service = RetrievalService::new(config, embedding, pinecone);

            let matches = service.top_matches(&query, &namespace, top_k).await?;
            if matches.is_empty() {
                println!("No matches in namespace '{namespace}'.");
                return Ok(());
            }
            for entry in &matches {
                println!("{:.4}  {}", entry.score, entry.id);
            }
            let context = service
                .retrieve_context_with(&query, &namespace, top_k, max_chars)
                .await?;
            println!("\n{context}");
        }
        Command::Stats => {
            let stats = pinecone
                .describe_index_stats(&config.pinecone_index_name)
                .await?;
            println!(
                "Index '{}': {} vector(s) total",
                config.pinecone_index_name, stats.total_vector_count
            );
            let mut namespaces: Vec<_> = stats.namespaces.iter().collect();
            namespaces.sort_by(|a, b| a.0.cmp(b.0));
            for (name, ns) in namespaces {
                println!("  {name}: {} vector(s)", ns.vector_count);
            }
        }
        Command::DeleteNamespace { namespace } => {
            pinecone
                .delete_namespace(&config.pinecone_index_name, &namespace)
                .await?;
            println!("Deleted all vectors in namespace '{namespace}'.");
        }
        Command::DeleteIndex { yes } => {
            if !yes {
                bail!(
                    "refusing to delete index '{}' without --yes",
                    config.pinecone_index_name
                );
            }
            pinecone.delete_index(&config.pinecone_index_name).await?;
            println!("Deleted index '{}'.", config.pinecone_index_name);
        }
    }

    Ok(())
}

/// Ingest a single file, or every supported file under a directory.
///
/// Directory batches run sequentially; each document's pipeline completes (or
/// aborts) on its own, so interrupting between documents leaves no partial
/// writes.
async fn ingest(
    service: &IngestService,
    path: &std::path::Path,
    namespace: &str,
    doc_id_prefix: Option<&str>,
) -> anyhow::Result<()> {
    if path.is_dir() {
        if doc_id_prefix.is_some() {
            bail!("--doc-id-prefix only applies to single-file ingestion");
        }
        let mut found = false;
        for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() || !service.supports(entry.path()) {
                continue;
            }
            found = true;
            let outcome = service
                .upsert_document(entry.path(), namespace, None)
                .await
                .with_context(|| format!("failed to ingest {}", entry.path().display()))?;
            println!(
                "{}: {} chunk(s), {} vector(s)",
                entry.path().display(),
                outcome.chunk_count,
                outcome.vectors_upserted
            );
        }
        if !found {
            bail!("no supported documents found under {}", path.display());
        }
    } else {
        let outcome = service
            .upsert_document(path, namespace, doc_id_prefix)
            .await
            .with_context(|| format!("failed to ingest {}", path.display()))?;
        println!(
            "{}: {} chunk(s), {} vector(s)",
            path.display(),
            outcome.chunk_count,
            outcome.vectors_upserted
        );
    }
    Ok(())
}
