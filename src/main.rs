use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rag_rig_cli::{config::AppConfig, llm::LlmManager, rag::{InitOutcome, RagEngine}};

#[tokio::main]
async fn main() {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        error!("Error fatal: {err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // 2. Cargar configuración y construir el cliente LLM
    let cfg = AppConfig::from_env()?;
    let llm = LlmManager::from_config(&cfg)?;

    // 3. Inicializar el motor RAG (con `--reload` se fuerza la re-ingesta)
    let force_reload = std::env::args().any(|arg| arg == "--reload");
    let mut engine = RagEngine::new(cfg, llm)?;
    match engine.initialize(force_reload).await? {
        InitOutcome::LoadedFromDisk => info!("Índice cargado de disco."),
        InitOutcome::Ingested(summary) => info!("Ingesta completada. {summary}"),
    }

    println!("Sistema RAG listo. Escribe tu pregunta ('quit' para salir).\n");

    // 4. Bucle interactivo de preguntas
    let stdin = io::stdin();
    loop {
        print!("Pregunta: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();

        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("¡Hasta luego!");
            break;
        }
        if question.is_empty() {
            continue;
        }

        match engine.ask(question).await {
            Ok(result) => {
                println!("\nRespuesta: {}\n", result.answer);
                if !result.sources.is_empty() {
                    println!("Fuentes:");
                    for (i, source) in result.sources.iter().enumerate() {
                        println!("  {}. {}", i + 1, source);
                    }
                }
                println!();
            }
            Err(err) => {
                error!("Error al procesar la pregunta: {err}");
                eprintln!("Error: {err}\n");
            }
        }
    }

    Ok(())
}
