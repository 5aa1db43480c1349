//! knowgraph CLI: browse the knowledge graph views of a running server

mod client;

use clap::{Parser, Subcommand};
use client::{ClientResult, RemoteClient};
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "knowgraph", version, about = "knowgraph read API CLI")]
struct Cli {
    /// Server HTTP URL
    #[arg(long, default_value = "http://localhost:8080", global = true, env = "KNOWGRAPH_URL")]
    url: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Response locale for single-locale views
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Get server status
    Status,
    /// List macro-clusters
    Overview,
    /// Show a macro-cluster with its clusters
    Macro { slug: String },
    /// Show a cluster with its segments and their content
    Cluster { slug: String },
    /// List all content assets
    Catalog,
    /// Show one content asset, by id or by type and slug
    Item {
        /// Asset id, or the content type when a slug follows
        key: String,
        slug: Option<String>,
    },
    /// Cross-tabulate content
    Matrix {
        #[arg(long)]
        cluster_id: String,
        /// SEGMENT_SEGMENT, SEGMENT_PERSPECTIVE or ROLE_PERSPECTIVE
        #[arg(long)]
        mode: String,
        #[arg(long)]
        perspective: Option<String>,
        #[arg(long)]
        content_types: Option<String>,
        /// Comma-separated role ids
        #[arg(long)]
        x_ids: Option<String>,
        #[arg(long)]
        y_cluster_id: Option<String>,
        #[arg(long)]
        cell_limit: Option<usize>,
    },
    /// Merged multi-locale catalog index
    Index {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        types: Option<String>,
        #[arg(long)]
        languages: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Public sitemap nodes
    Sitemap {
        #[arg(long)]
        langs: Option<String>,
        #[arg(long)]
        include_review: bool,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = RemoteClient::new(&cli.url);

    if let Err(e) = run(&client, cli.command, cli.lang, &cli.format).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(client: &RemoteClient, command: Commands, lang: Option<String>, format: &OutputFormat) -> ClientResult<()> {
    let render: fn(&Value) = match &command {
        Commands::Status => render_status,
        Commands::Overview | Commands::Catalog => render_assets,
        Commands::Macro { .. } | Commands::Cluster { .. } => render_tree,
        Commands::Item { .. } => render_fields,
        Commands::Matrix { .. } => render_matrix,
        Commands::Index { .. } | Commands::Sitemap { .. } => render_index,
    };

    let lang_query = [("lang", lang.clone())];
    let value = match command {
        Commands::Status => client.get(&["status"], &[]).await?,
        Commands::Overview => client.get(&["grid", "overview"], &lang_query).await?,
        Commands::Macro { slug } => client.get(&["grid", "macroclusters", &slug], &lang_query).await?,
        Commands::Cluster { slug } => client.get(&["grid", "clusters", &slug], &lang_query).await?,
        Commands::Catalog => client.get(&["catalog"], &lang_query).await?,
        Commands::Item { key, slug } => match slug {
            Some(slug) => client.get(&["catalog", &key, &slug], &lang_query).await?,
            None => client.get(&["catalog", &key], &lang_query).await?,
        },
        Commands::Matrix {
            cluster_id,
            mode,
            perspective,
            content_types,
            x_ids,
            y_cluster_id,
            cell_limit,
        } => {
            let query = [
                ("clusterId", Some(cluster_id)),
                ("mode", Some(mode)),
                ("perspective", perspective),
                ("contentTypes", content_types),
                ("xIds", x_ids),
                ("yClusterId", y_cluster_id),
                ("cellLimit", cell_limit.map(|n| n.to_string())),
                ("lang", lang),
            ];
            client.get(&["matrix"], &query).await?
        }
        Commands::Index {
            status,
            types,
            languages,
            page,
            limit,
        } => {
            let query = [
                ("status", status),
                ("types", types),
                ("languages", languages),
                ("page", page.map(|n| n.to_string())),
                ("limit", limit.map(|n| n.to_string())),
            ];
            client.get(&["system", "catalog", "index"], &query).await?
        }
        Commands::Sitemap {
            langs,
            include_review,
            page,
            limit,
        } => {
            let query = [
                ("langs", langs),
                ("includeReview", include_review.then(|| "true".to_string())),
                ("page", page.map(|n| n.to_string())),
                ("limit", limit.map(|n| n.to_string())),
            ];
            client.get(&["public", "sitemap", "nodes"], &query).await?
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Table => render(&value),
    }
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn text(v: &Value, key: &str) -> String {
    v.get(key).map(format_table_value).unwrap_or_default()
}

fn render_status(v: &Value) {
    println!("Status:  {}", text(v, "status"));
    println!("Version: {}", text(v, "version"));
}

fn render_assets(v: &Value) {
    let items = v.as_array().map(Vec::as_slice).unwrap_or_default();
    if items.is_empty() {
        println!("(no results)");
        return;
    }
    let mut table = new_table(&["type", "slug", "name", "status", "children"]);
    for item in items {
        table.add_row(vec![
            text(item, "type"),
            text(item, "slug"),
            text(item, "name"),
            text(item, "status"),
            text(item, "childrenCount"),
        ]);
    }
    println!("{}", table);
    println!("{} item(s)", items.len());
}

fn render_tree(v: &Value) {
    let mut table = new_table(&["type", "slug", "name", "children"]);
    let mut stack = vec![(v, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        table.add_row(vec![
            text(node, "type"),
            format!("{}{}", "  ".repeat(depth), text(node, "slug")),
            text(node, "name"),
            text(node, "childrenCount"),
        ]);
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    println!("{}", table);
}

fn render_fields(v: &Value) {
    let mut table = new_table(&["field", "value"]);
    if let Some(map) = v.as_object() {
        for (key, value) in map {
            let empty = match value {
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                Value::Null => true,
                _ => false,
            };
            if !empty {
                table.add_row(vec![key.clone(), format_table_value(value)]);
            }
        }
    }
    println!("{}", table);
}

fn render_matrix(v: &Value) {
    let axis = |key: &str| v.get(key).and_then(Value::as_array).cloned().unwrap_or_default();
    let (x_axis, y_axis) = (axis("xAxis"), axis("yAxis"));
    let cells = v.get("cells").and_then(Value::as_array).cloned().unwrap_or_default();

    let mut header = vec![String::new()];
    header.extend(y_axis.iter().map(|y| text(y, "label")));
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for x in &x_axis {
        let x_id = text(x, "id");
        let mut row = vec![text(x, "label")];
        for y in &y_axis {
            let y_id = text(y, "id");
            let cell = cells
                .iter()
                .find(|c| text(c, "xId") == x_id && text(c, "yId") == y_id);
            row.push(match cell {
                Some(c) if text(c, "hasMore") == "true" => format!("{}+", text(c, "count")),
                Some(c) => text(c, "count"),
                None => String::new(),
            });
        }
        table.add_row(row);
    }
    println!("{}", table);
    if let Some(stats) = v.get("stats") {
        println!(
            "{} non-empty cell(s), {} item(s), cell limit {}",
            text(stats, "nonEmptyCells"),
            text(stats, "totalItems"),
            text(stats, "cellLimit")
        );
    }
}

fn render_index(v: &Value) {
    let items = v.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
    let mut table = new_table(&["type", "slug", "id", "status", "updated", "languages"]);
    for item in &items {
        table.add_row(vec![
            text(item, "type"),
            text(item, "slug"),
            text(item, "id"),
            text(item, "status"),
            text(item, "updatedAt"),
            text(item, "availableLanguages"),
        ]);
    }
    println!("{}", table);
    println!(
        "page {} ({} per page), {} total{}",
        text(v, "page"),
        text(v, "limit"),
        text(v, "total"),
        if text(v, "hasMore") == "true" { ", more available" } else { "" }
    );
}

fn format_table_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.get("label").or_else(|| item.get("name")) {
                Some(label) => format_table_value(label),
                None => serde_json::to_string(item).unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}
