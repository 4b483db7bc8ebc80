//! Registers a small compiler front-end architecture, wires it up, and
//! prints what the graph engine sees.
//!
//! Run with `RUST_LOG=debug cargo run --example wiring_demo` to watch
//! the services log their decisions.

use anyhow::Result;
use archwire_core::{
    ComponentSymbol, PortDefinition, PortDirection, SymbolKind, TypeReference, Version,
};
use archwire_ops::{ConnectRequest, GraphRequest, Workbench};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bench = Workbench::in_memory();
    let symbols = bench.symbol_table();

    let token = ComponentSymbol::new("core", "Token", Version::new(1, 0, 0), SymbolKind::DataType)
        .with_description("lexical token");
    let ast = ComponentSymbol::new("core", "Ast", Version::new(1, 0, 0), SymbolKind::DataType)
        .with_description("syntax tree");
    let token_ty = TypeReference::new(token.id.clone());
    let ast_ty = TypeReference::new(ast.id.clone());

    let lexer = ComponentSymbol::new("front", "Lexer", Version::new(1, 0, 0), SymbolKind::Component)
        .with_port(PortDefinition::new("tokens", PortDirection::Out, token_ty.clone()));
    let parser =
        ComponentSymbol::new("front", "Parser", Version::new(1, 0, 0), SymbolKind::Component)
            .with_port(
                PortDefinition::new("tokens", PortDirection::In, token_ty.clone()).required(),
            )
            .with_port(PortDefinition::new("ast", PortDirection::Out, ast_ty.clone()));
    let checker =
        ComponentSymbol::new("front", "Checker", Version::new(1, 0, 0), SymbolKind::Component)
            .with_port(PortDefinition::new("ast", PortDirection::In, ast_ty.clone()).required());

    symbols.register(token)?;
    symbols.register(ast)?;
    let lexer_id = symbols.register(lexer)?;
    let parser_id = symbols.register(parser)?;
    let checker_id = symbols.register(checker)?;

    let wiring = bench.wiring_service();
    wiring.connect(ConnectRequest::between(
        lexer_id.clone(),
        "tokens",
        parser_id.clone(),
        "tokens",
    ))?;
    wiring.connect(ConnectRequest::between(
        parser_id.clone(),
        "ast",
        checker_id.clone(),
        "ast",
    ))?;

    let graph = bench.graph_service();
    let stats = graph.stats(&GraphRequest::default())?;
    println!("nodes: {}, edges: {}", stats.node_count, stats.edge_count);
    println!("roots: {}, leaves: {}", stats.root_count, stats.leaf_count);
    println!("cycles: {}", stats.has_cycles);

    match graph.topological_order(&GraphRequest::default())? {
        Some(order) => {
            println!("build order:");
            for id in order {
                println!("  {id}");
            }
        }
        None => println!("no build order: the graph is cyclic"),
    }

    for unconnected in wiring.unconnected_required_ports()? {
        println!(
            "warning: required port {}#{} is unconnected",
            unconnected.symbol, unconnected.port
        );
    }

    for candidate in wiring.compatible_ports(&lexer_id, "tokens")? {
        println!(
            "{lexer_id}#tokens could also feed {}#{} (score {})",
            candidate.symbol, candidate.port, candidate.score
        );
    }

    Ok(())
}
