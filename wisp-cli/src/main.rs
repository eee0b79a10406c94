//! Wisp CLI
//!
//! Reads a captured raw HTTP/1.1 response (or bare HTML) and prints what the
//! parsers made of it.

use std::fs;
use std::io::{self, Read as _};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use wisp_browser::{LoadedDocument, ResponseLoader};
use wisp_css::RuleSet;
use wisp_html::{Document, HTMLParser, HTMLTokenizer, Token, TreeBuilder, print_tree};
use wisp_http::HttpResponse;

/// Wisp: parse a raw HTTP response into a styled DOM tree
#[derive(Parser, Debug)]
#[command(name = "wisp")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Parse a captured response
    wisp response.txt

    # Read the response from stdin, delivered 7 bytes at a time
    cat response.txt | wisp --chunk-size 7 -

    # Parse inline HTML and show the tokens and rules
    wisp --tokens --rules --html '<style>p { color: red }</style><p>hi</p>'

    # Dump the document as JSON
    wisp --json response.txt
"#)]
struct Cli {
    /// Raw HTTP response to parse, or `-` for stdin
    #[arg(value_name = "FILE", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Parse this HTML string directly, without an HTTP envelope
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Feed the response parser this many bytes at a time
    #[arg(long, value_name = "N")]
    chunk_size: Option<NonZeroUsize>,

    /// Print the HTML token stream
    #[arg(long)]
    tokens: bool,

    /// Print the rules collected from `<style>` elements
    #[arg(long)]
    rules: bool,

    /// Print the parsed result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Skip style computation
    #[arg(long)]
    no_styles: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref html) = cli.html {
        let document = parse_html(html, !cli.no_styles)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&document)?);
            return Ok(());
        }
        if cli.tokens {
            print_tokens(html)?;
        }
        print_document(&document, cli.rules);
        return Ok(());
    }

    let Some(ref path) = cli.path else {
        bail!("expected a response FILE (or `-` for stdin), or --html");
    };
    let bytes = read_input(path)?;
    let loaded = load(&bytes, cli.chunk_size, !cli.no_styles)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&loaded)?);
        return Ok(());
    }

    print_response(&loaded.response);
    if cli.tokens {
        print_tokens(&loaded.response.body)?;
    }
    print_document(&loaded.document, cli.rules);
    Ok(())
}

/// Read the whole response from a file or stdin
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        let _ = io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read response from stdin")?;
        Ok(bytes)
    } else {
        fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
    }
}

/// Run the response bytes through a loader, optionally in fixed-size slices
fn load(bytes: &[u8], chunk_size: Option<NonZeroUsize>, styles: bool) -> Result<LoadedDocument> {
    let mut loader = ResponseLoader::new().with_style_computation(styles);
    let slice_len = chunk_size.map_or(bytes.len().max(1), NonZeroUsize::get);
    for slice in bytes.chunks(slice_len) {
        loader
            .receive(slice)
            .with_context(|| format!("response parser stopped in {}", loader.state()))?;
    }
    loader.finish().context("failed to load document")
}

fn parse_html(html: &str, styles: bool) -> Result<Document> {
    let builder = TreeBuilder::default().with_style_computation(styles);
    let mut parser = HTMLParser::with_builder(builder);
    parser.feed(html).context("failed to parse HTML")?;
    parser.finish().context("failed to parse HTML")
}

fn print_response(response: &HttpResponse) {
    println!("=== Response ===");
    println!("{} {}", response.status_code, response.status_text);
    for header in &response.headers {
        println!("{}: {}", header.name, header.value);
    }
    println!();
}

/// Print tokens one per line, with runs of text joined together
fn print_tokens(html: &str) -> Result<()> {
    let tokens = HTMLTokenizer::tokenize(html).context("failed to tokenize HTML")?;
    println!("=== Tokens ===");
    let mut text = String::new();
    for token in tokens {
        if let Token::Text(c) = token {
            text.push(c);
            continue;
        }
        if !text.is_empty() {
            println!("Text({text:?})");
            text.clear();
        }
        println!("{token}");
    }
    println!();
    Ok(())
}

fn print_document(document: &Document, show_rules: bool) {
    println!("=== DOM Tree ===");
    print_tree(&document.tree, document.tree.root());

    if show_rules {
        println!("\n=== Rules ===");
        print_rules(&document.rules);
    }
}

fn print_rules(rules: &RuleSet) {
    println!("{} rules", rules.len());
    for rule in rules.rules() {
        let selectors: Vec<&str> = rule.selectors.iter().map(|s| s.text.as_str()).collect();
        let declarations: Vec<String> = rule
            .declarations
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important", d.name, d.value)
                } else {
                    format!("{}: {}", d.name, d.value)
                }
            })
            .collect();
        println!("  {} {{ {} }}", selectors.join(", "), declarations.join("; "));
    }
}
