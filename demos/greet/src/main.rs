//! Greeter service that documents itself.
//!
//! Registers a handful of routes under `/api/v1`, then either prints the
//! derived IDL, lists the route table, or dispatches a single request.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use protodoc::{ApiError, Config, HandleOption, Message, Method, ReplyBody, Service};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "protodoc-demo")]
#[command(about = "Greeter service that prints its own protobuf IDL")]
struct Args {
	/// Service configuration (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the rendered IDL document
	Doc,
	/// List registered routes
	Routes,
	/// Dispatch one request and print the reply
	Call {
		/// HTTP method, case-insensitive
		method: String,
		path: String,
		/// Request input as a JSON object
		#[arg(default_value = "{}")]
		input: String,
	},
}

#[derive(Debug, Deserialize, Message)]
pub struct GreetReq {
	#[message(uri = "name")]
	pub name: String,
	#[serde(default)]
	#[message(header = "X-Head")]
	pub head: String,
	#[serde(default)]
	#[message(form = "num1")]
	pub num1: i32,
	#[serde(default)]
	#[message(form = "num2")]
	pub num2: i32,
}

#[derive(Debug, Serialize, Message)]
pub struct GreetRsp {
	pub greet: String,
	pub head: String,
	pub num1: i32,
	pub num2: i32,
}

fn handle_greet(req: GreetReq) -> anyhow::Result<GreetRsp> {
	Ok(GreetRsp {
		greet: format!("hello {}!", req.name),
		head: req.head,
		num1: req.num1,
		num2: req.num2,
	})
}

fn handle_checked_greet(req: GreetReq) -> anyhow::Result<GreetRsp> {
	if req.num1 < 0 || req.num2 < 0 {
		return Err(ApiError::new(1001, "negative numbers for {}: {}, {}")
			.with_status(422)
			.extend([req.name, req.num1.to_string(), req.num2.to_string()])
			.into());
	}
	handle_greet(req)
}

fn build_service(config: Config) -> anyhow::Result<Service> {
	let service = Service::new(config);
	let api = service.group("/api/v1");

	api.get("/test/:name", handle_greet, &[])?;
	api.get(
		"/test_no_data_wrap/:name",
		handle_greet,
		&[HandleOption::NoDataWrap],
	)?;
	api.get("/test_checked/:name", handle_checked_greet, &[])?;

	if let Some(doc) = service.root().serve_doc(None)? {
		info!(path = doc.path(), "serving IDL document");
	}
	Ok(service)
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default().with_serve_doc(true),
	};
	let service = build_service(config)?;

	match args.command.unwrap_or(Command::Doc) {
		Command::Doc => print!("{}", service.render()),
		Command::Routes => {
			for route in service.routes() {
				let marker = if route.is_documented() { "" } else { " (undocumented)" };
				println!(
					"{:<7} {:<36} {}{marker}",
					route.method().as_str(),
					route.path(),
					route.operation()
				);
			}
		}
		Command::Call {
			method,
			path,
			input,
		} => {
			let method: Method = method
				.parse()
				.with_context(|| format!("unknown method {method:?}"))?;
			let input: serde_json::Value =
				serde_json::from_str(&input).context("request input is not JSON")?;
			let reply = service.dispatch(method, &path, input);
			println!("{}", reply.status);
			match reply.body {
				ReplyBody::Json(body) => println!("{}", serde_json::to_string_pretty(&body)?),
				ReplyBody::Text(body) => print!("{body}"),
			}
		}
	}

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("protodoc=debug,protodoc_schema=trace,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
