use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, delete, get, post, put, web};
use clap::Parser;
use serde::{Deserialize, Serialize};

use tile_markov_core::io::{get_filename, list_files, load_training, normalize_folder};
use tile_markov_core::model::Symbol;
use tile_markov_core::model::generation_config::{DEFAULT_ORDER, DEFAULT_VOCABULARY_SIZE, GenerationConfig};
use tile_markov_core::model::generator::{BatchReport, Generator, Step};

/// Command-line arguments of the generation service
#[derive(Parser)]
#[command(name = "tile-markov-server", version, about = "HTTP front end for tile Markov generation")]
struct Cli {
	/// Number of known tile types; symbols are 0..V
	#[arg(short, long, default_value_t = DEFAULT_VOCABULARY_SIZE)]
	vocabulary: usize,

	/// Maximum context length before backing off
	#[arg(short, long, default_value_t = DEFAULT_ORDER)]
	order: usize,

	/// Random seed for reproducible generation
	#[arg(short, long)]
	seed: Option<u64>,

	/// Folder holding `.txt` training files
	#[arg(short, long, default_value = "./data")]
	data: String,

	/// Largest batch a single `/v1/generate` request may ask for
	#[arg(short = 'm', long, default_value_t = 10_000)]
	max_count: usize,

	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,
}

struct SharedData {
	generator: Generator,
	data_dir: PathBuf,
	max_count: usize,
}

#[derive(Deserialize)]
struct ConfigQuery {
	order: Option<usize>,
}

#[derive(Deserialize)]
struct ImportQuery {
	clear: Option<bool>,
}

#[derive(Deserialize)]
struct CorporaQuery {
	names: Option<String>,
	clear: Option<bool>,
}

#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
	seed: Option<u64>,
}

#[derive(Serialize)]
struct GenerateResponse<'a> {
	#[serde(flatten)]
	report: BatchReport,
	steps: Vec<Step>,
	history: &'a [Symbol],
}

#[derive(Serialize)]
struct HistoryResponse<'a> {
	history: &'a [Symbol],
	vocabulary_size: usize,
}

macro_rules! lock_or_500 {
	($data:expr) => {
		match $data.lock() {
			Ok(guard) => guard,
			Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
		}
	};
}

/// HTTP GET endpoint `/v1/config`
#[get("/v1/config")]
async fn get_config(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_or_500!(data);
	HttpResponse::Ok().json(shared_data.generator.config())
}

/// HTTP PUT endpoint `/v1/config`
///
/// Changes the maximum context length used by later generations.
#[put("/v1/config")]
async fn put_config(data: web::Data<Mutex<SharedData>>, query: web::Query<ConfigQuery>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	if let Some(order) = query.order {
		if let Err(e) = shared_data.generator.set_order(order) {
			return HttpResponse::BadRequest().body(e.to_string());
		}
	}
	HttpResponse::Ok().json(shared_data.generator.config())
}

/// HTTP GET endpoint `/v1/vocabulary`
///
/// Returns the number of known tile types.
#[get("/v1/vocabulary")]
async fn get_vocabulary(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_or_500!(data);
	HttpResponse::Ok().json(shared_data.generator.vocabulary_size())
}

/// HTTP PUT endpoint `/v1/corpus`
///
/// Imports the request body as training text. Malformed tokens are
/// reported back, not rejected.
#[put("/v1/corpus")]
async fn put_corpus(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<ImportQuery>,
	body: String,
) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	let import = shared_data.generator.import_text(&body, query.clear.unwrap_or(false));
	HttpResponse::Ok().json(import)
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_or_500!(data);
	match list_files(&shared_data.data_dir, "txt") {
		Ok(files) => {
			let names: Vec<String> = files.iter().filter_map(|file| get_filename(file).ok()).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// HTTP PUT endpoint `/v1/load_corpora`
///
/// Imports `<data>/<name>.txt` for every comma-separated name. Only files
/// listed by `/v1/corpora` are accepted. Every file is loaded before the
/// generator is touched, so a failing name leaves corpus and history as
/// they were. With `clear=true` both are emptied before the import.
#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<Mutex<SharedData>>, query: web::Query<CorporaQuery>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let available = match list_files(&shared_data.data_dir, "txt") {
		Ok(files) => files,
		Err(_) => return HttpResponse::InternalServerError().body("Failed to list corpora"),
	};

	let mut sequences = Vec::new();
	for name in query_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		let file = format!("{name}.txt");
		if !available.contains(&file) {
			return HttpResponse::BadRequest().body(format!("Unknown corpus: {name}"));
		}
		match load_training(shared_data.data_dir.join(&file)) {
			Ok(loaded) => sequences.extend(loaded),
			Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
		}
	}

	let report = shared_data.generator.import_sequences(sequences, query.clear.unwrap_or(false));
	HttpResponse::Ok().json(report)
}

#[get("/v1/history")]
async fn get_history(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_or_500!(data);
	HttpResponse::Ok().json(HistoryResponse {
		history: shared_data.generator.history(),
		vocabulary_size: shared_data.generator.vocabulary_size(),
	})
}

#[delete("/v1/history")]
async fn delete_history(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	shared_data.generator.clear_history();
	HttpResponse::NoContent().finish()
}

/// HTTP POST endpoint `/v1/history/{symbol}`
///
/// Places one tile by hand.
#[post("/v1/history/{symbol}")]
async fn post_history(data: web::Data<Mutex<SharedData>>, path: web::Path<Symbol>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	match shared_data.generator.append(path.into_inner()) {
		Ok(()) => HttpResponse::Ok().json(shared_data.generator.history()),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// HTTP POST endpoint `/v1/generate`
///
/// Generates `count` symbols (default 1, at most `--max-count`) in one
/// batch while holding the lock, so no other request interleaves with the run.
#[post("/v1/generate")]
async fn post_generate(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	let count = query.count.unwrap_or(1);
	if count > shared_data.max_count {
		return HttpResponse::BadRequest()
			.body(format!("count {count} exceeds the limit of {}", shared_data.max_count));
	}
	if let Some(seed) = query.seed {
		shared_data.generator.reseed(seed);
	}

	let mut steps = Vec::new();
	let report = shared_data.generator.generate_many(count, |step, _| {
		steps.push(*step);
		ControlFlow::Continue(())
	});

	HttpResponse::Ok().json(GenerateResponse { report, steps, history: shared_data.generator.history() })
}

/// Registers every route of the service.
fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_config)
		.service(put_config)
		.service(get_vocabulary)
		.service(put_corpus)
		.service(get_corpora)
		.service(put_corpora)
		.service(get_history)
		.service(delete_history)
		.service(post_history)
		.service(post_generate);
}

/// Main entry point for the server.
///
/// Builds one generator from the command line, wraps it in a `Mutex`
/// and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let mut config = GenerationConfig::new(cli.vocabulary, cli.order)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	config.seed = cli.seed;

	let shared_data = SharedData {
		generator: Generator::new(config),
		data_dir: normalize_folder(&cli.data),
		max_count: cli.max_count,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	log::info!("listening on {}:{}", cli.host, cli.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(configure)
	})
		.bind((cli.host.as_str(), cli.port))?
		.run()
		.await
}
