//! Interactive form mode.
//!
//! Fills in an extraction task line by line: preset or manual prompt and
//! classes, few-shot examples, input document and backend, then runs it.

use crate::backend::Backend;
use crate::commands::{ensure_ready, run_extraction, RunOptions};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::input::InputSource;
use crate::output::Formatter;
use crate::session::{parse_classes, parse_extraction_line, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use studio_domain::{ExampleData, Preset};
use studio_extractor::{ExtractorConfig, MAX_CHAR_BUFFER, MAX_PASSES, MAX_WORKERS};
use studio_llm::{Provider, ProviderKind};

/// Form state between commands.
pub struct FormState {
    /// Task being filled in
    pub session: Session,
    /// Model backend
    pub backend: Backend,
    /// Engine options before provider narrowing
    pub engine: ExtractorConfig,
    /// Classes shown in the result list; all when empty
    pub class_filter: Vec<String>,
    /// Directory results are written to
    pub output_dir: PathBuf,
}

impl FormState {
    /// Start from the configuration file's defaults.
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(),
            backend: Backend::from_config(config),
            engine: config.extraction.clone(),
            class_filter: Vec::new(),
            output_dir: config.settings.output_dir.clone(),
        }
    }

    /// Apply a command that needs no terminal or network access.
    ///
    /// Returns the confirmation to print.
    pub fn apply(&mut self, command: FormCommand) -> Result<String> {
        let message = match command {
            FormCommand::Preset(id) => {
                let preset = Preset::resolve(&id)?;
                let message = format!(
                    "Loaded preset {} ({} classes, {} examples)",
                    preset.display_name,
                    preset.classes.len(),
                    preset.examples.len()
                );
                self.session.load_preset(preset);
                message
            }
            FormCommand::Prompt(prompt) => {
                self.session.prompt = prompt;
                "Prompt set".to_string()
            }
            FormCommand::Classes(csv) => {
                self.session.set_classes(&csv);
                format!("Classes: {}", self.session.classes.join(", "))
            }
            FormCommand::Remove(position) => {
                let removed = self.session.remove_example(position)?;
                format!("Removed example {}: {}", position, removed.preview(40))
            }
            FormCommand::Clear => {
                self.session.clear_examples();
                "Examples cleared".to_string()
            }
            FormCommand::Text(Some(text)) => {
                let count = text.chars().count();
                self.session.document = Some(text);
                format!("Document set ({} chars)", count)
            }
            FormCommand::Provider(kind) => {
                self.backend.set_kind(kind);
                format!("Provider {} with model {}", kind, self.backend.model())
            }
            FormCommand::Model(model) => {
                let message = format!("Model {}", model);
                self.backend.model = Some(model);
                message
            }
            FormCommand::Key(key) => {
                self.backend.api_key = Some(key);
                "API key set".to_string()
            }
            FormCommand::Passes(passes) => {
                self.engine = self.engine.clone().with_passes(passes);
                format!("Extraction passes: {}", passes)
            }
            FormCommand::Workers(workers) => {
                self.engine = self.engine.clone().with_workers(workers);
                format!("Max workers: {}", workers)
            }
            FormCommand::Chunk(size) => {
                self.engine = self.engine.clone().with_char_buffer(size);
                format!("Max chars per chunk: {}", size)
            }
            FormCommand::Filter(classes) => {
                let message = if classes.is_empty() {
                    "Showing all classes".to_string()
                } else {
                    format!("Showing only: {}", classes.join(", "))
                };
                self.class_filter = classes;
                message
            }
            other => {
                return Err(CliError::InvalidInput(format!(
                    "{:?} needs the interactive form",
                    other
                )))
            }
        };
        Ok(message)
    }

    /// Options for the next run.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            engine: self.backend.engine_config(&self.engine),
            output_dir: self.output_dir.clone(),
            class_filter: self.class_filter.clone(),
            document_id: "document".to_string(),
        }
    }
}

/// Run the interactive form.
pub async fn run_form(config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.info("Extract Studio - Type 'help' for commands, 'exit' to quit"));
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)
        .map_err(editor_error)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config).map_err(editor_error)?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut state = FormState::new(config);

    loop {
        let prompt = match state.session.loaded_preset {
            Some(id) => format!("studio ({})> ", id),
            None => "studio> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_form_command(line) {
                    Ok(FormCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(command) => {
                        if let Err(e) = execute_form_command(command, &mut state, &mut editor, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// Form command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    /// Leave the form
    Exit,
    /// Show commands
    Help,
    /// List presets
    Presets,
    /// Load a preset
    Preset(String),
    /// Set the prompt
    Prompt(String),
    /// Set the classes from comma-separated text
    Classes(String),
    /// Enter an example interactively
    Example,
    /// List examples
    Examples,
    /// Remove the example at a 1-based position
    Remove(usize),
    /// Remove every example
    Clear,
    /// Set the document inline, or paste it when no text is given
    Text(Option<String>),
    /// Fetch the document from a URL
    Url(String),
    /// Read the document from a file
    File(PathBuf),
    /// Switch provider
    Provider(ProviderKind),
    /// Choose the model
    Model(String),
    /// Set the API key
    Key(String),
    /// Extraction passes
    Passes(usize),
    /// Concurrent model calls
    Workers(usize),
    /// Maximum characters per chunk
    Chunk(usize),
    /// Classes shown in the result list
    Filter(Vec<String>),
    /// Show the checklist and settings
    Status,
    /// Run the extraction
    Run,
}

/// Parse a form command line.
pub fn parse_form_command(line: &str) -> Result<FormCommand> {
    let (command, rest) = match line.trim().split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line.trim(), ""),
    };

    let required = |usage: &str| {
        if rest.is_empty() {
            Err(CliError::InvalidInput(format!("Usage: {}", usage)))
        } else {
            Ok(rest.to_string())
        }
    };

    match command {
        "exit" | "quit" | "q" => Ok(FormCommand::Exit),
        "help" | "?" => Ok(FormCommand::Help),
        "presets" => Ok(FormCommand::Presets),
        "preset" => required("preset <id>").map(FormCommand::Preset),
        "prompt" => required("prompt <description>").map(FormCommand::Prompt),
        "classes" => required("classes <class>, <class>, ...").map(FormCommand::Classes),
        "example" => Ok(FormCommand::Example),
        "examples" => Ok(FormCommand::Examples),
        "remove" => Ok(FormCommand::Remove(parse_number(rest, "remove <n>", 1, usize::MAX)?)),
        "clear" => Ok(FormCommand::Clear),
        "text" => Ok(FormCommand::Text((!rest.is_empty()).then(|| rest.to_string()))),
        "url" => required("url <address>").map(FormCommand::Url),
        "file" => required("file <path>").map(|p| FormCommand::File(PathBuf::from(p))),
        "provider" => {
            let name = required("provider gemini|openai|ollama")?;
            Ok(FormCommand::Provider(name.parse::<ProviderKind>()?))
        }
        "model" => required("model <id>").map(FormCommand::Model),
        "key" => required("key <api key>").map(FormCommand::Key),
        "passes" => Ok(FormCommand::Passes(parse_number(rest, "passes <1-5>", 1, MAX_PASSES)?)),
        "workers" => Ok(FormCommand::Workers(parse_number(rest, "workers <1-20>", 1, MAX_WORKERS)?)),
        "chunk" => Ok(FormCommand::Chunk(parse_number(
            rest,
            "chunk <0-100000>",
            0,
            MAX_CHAR_BUFFER,
        )?)),
        "filter" => Ok(FormCommand::Filter(match rest {
            "" | "all" | "none" => Vec::new(),
            classes => parse_classes(classes),
        })),
        "status" => Ok(FormCommand::Status),
        "run" => Ok(FormCommand::Run),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            command
        ))),
    }
}

fn parse_number(input: &str, usage: &str, min: usize, max: usize) -> Result<usize> {
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| CliError::InvalidInput(format!("Usage: {}", usage)))
}

/// Execute a form command.
async fn execute_form_command(
    command: FormCommand,
    state: &mut FormState,
    editor: &mut DefaultEditor,
    formatter: &Formatter,
) -> Result<()> {
    match command {
        FormCommand::Help => print_help(formatter),
        FormCommand::Presets => println!("{}", formatter.format_presets(&Preset::all())?),
        FormCommand::Examples => println!("{}", formatter.format_examples(&state.session.examples)),
        FormCommand::Example => {
            let example = read_example(editor)?;
            state.session.add_example(example)?;
            println!(
                "{}",
                formatter.success(&format!("Example {} added", state.session.examples.len()))
            );
        }
        FormCommand::Text(None) => {
            println!("{}", formatter.info("Paste the document, then a line with a single '.'"));
            let text = read_block(editor, ".")?.join("\n");
            println!("{}", formatter.success(&state.apply(FormCommand::Text(Some(text)))?));
        }
        FormCommand::Url(url) => load_document(state, InputSource::Url(url), formatter).await?,
        FormCommand::File(path) => load_document(state, InputSource::File(path), formatter).await?,
        FormCommand::Status => print_status(state, formatter),
        FormCommand::Run => {
            ensure_ready(&state.session, &state.backend, formatter)?;
            let options = state.run_options();
            let provider = Provider::build(state.backend.settings(&options.engine))?;
            run_extraction(&state.session, provider, &options, formatter).await?;
        }
        other => println!("{}", formatter.success(&state.apply(other)?)),
    }
    Ok(())
}

async fn load_document(state: &mut FormState, source: InputSource, formatter: &Formatter) -> Result<()> {
    let text = source.load().await?;
    let message = format!("Loaded {} chars from {}", text.chars().count(), source.describe());
    state.session.document = Some(text);
    println!("{}", formatter.success(&message));
    Ok(())
}

/// Read a passage and its extraction lines.
fn read_example(editor: &mut DefaultEditor) -> Result<ExampleData> {
    println!("Example passage (finish with an empty line):");
    let passage = read_block(editor, "")?.join("\n");
    if passage.trim().is_empty() {
        return Err(CliError::InvalidInput("Example passage is empty".to_string()));
    }

    println!("Extractions as 'class | verbatim text | key=value, ...' (finish with an empty line):");
    let extractions = read_block(editor, "")?
        .iter()
        .map(|line| parse_extraction_line(line))
        .collect::<Result<Vec<_>>>()?;

    Ok(ExampleData::new(passage, extractions))
}

/// Read lines until `terminator` (compared after trimming) or end of input.
fn read_block(editor: &mut DefaultEditor, terminator: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        match editor.readline("... ") {
            Ok(line) if line.trim() == terminator => break,
            Ok(line) => lines.push(line),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => return Err(editor_error(e)),
        }
    }
    Ok(lines)
}

fn editor_error(e: ReadlineError) -> CliError {
    CliError::Io(std::io::Error::other(format!("Editor error: {}", e)))
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_status(state: &FormState, formatter: &Formatter) {
    println!("{}", formatter.checklist(&state.session.readiness(state.backend.has_api_key())));
    println!();
    let preset = state
        .session
        .loaded_preset
        .map_or_else(|| "none".to_string(), |id| id.to_string());
    println!("  Preset:     {}", preset);
    println!("  Classes:    {}", state.session.allowed_classes().join(", "));
    println!("  Examples:   {}", state.session.examples.len());
    println!("  Provider:   {} ({})", state.backend.kind, state.backend.model());
    println!(
        "  Engine:     {} pass(es), {} worker(s), {} chars per chunk",
        state.engine.extraction_passes, state.engine.max_workers, state.engine.max_char_buffer
    );
    if !state.class_filter.is_empty() {
        println!("  Showing:    {}", state.class_filter.join(", "));
    }
    println!("  Output dir: {}", state.output_dir.display());
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  presets                    - List presets");
    println!("  preset <id>                - Load a preset's prompt, classes and examples");
    println!("  prompt <text>              - Set the extraction prompt");
    println!("  classes <a, b, ...>        - Set the extraction classes");
    println!("  example                    - Add a few-shot example");
    println!("    passage lines, empty line, then 'class | verbatim text | k=v, k=v' lines");
    println!("  examples                   - List examples");
    println!("  remove <n>                 - Remove example n");
    println!("  clear                      - Remove all examples");
    println!("  text [document]            - Set the document (paste when no text given)");
    println!("  url <address>              - Fetch the document from a URL");
    println!("  file <path>                - Read the document from a .txt, .md or .csv file");
    println!("  provider <name>            - gemini, openai or ollama");
    println!("  model <id>                 - Choose the model");
    println!("  key <api key>              - Set the API key");
    println!("  passes <1-5>               - Extraction passes");
    println!("  workers <1-20>             - Concurrent model calls");
    println!("  chunk <0-100000>           - Max characters per chunk (0 = whole document)");
    println!("  filter [a, b | all]        - Classes shown in the result list");
    println!("  status                     - Show readiness and settings");
    println!("  run                        - Run the extraction");
    println!("  help, ?                    - Show this help");
    println!("  exit, quit, q              - Leave the form");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_form_command("q").unwrap(), FormCommand::Exit);
        assert_eq!(parse_form_command("?").unwrap(), FormCommand::Help);
        assert_eq!(parse_form_command("run").unwrap(), FormCommand::Run);
        assert_eq!(parse_form_command("text").unwrap(), FormCommand::Text(None));
    }

    #[test]
    fn test_parse_keeps_rest_of_line() {
        assert_eq!(
            parse_form_command("prompt Extract   parties and dates.").unwrap(),
            FormCommand::Prompt("Extract   parties and dates.".to_string())
        );
        assert_eq!(
            parse_form_command("text Took aspirin.").unwrap(),
            FormCommand::Text(Some("Took aspirin.".to_string()))
        );
    }

    #[test]
    fn test_parse_numbers_checked() {
        assert_eq!(parse_form_command("passes 3").unwrap(), FormCommand::Passes(3));
        assert!(parse_form_command("passes 6").is_err());
        assert!(parse_form_command("workers 0").is_err());
        assert_eq!(parse_form_command("chunk 0").unwrap(), FormCommand::Chunk(0));
        assert!(parse_form_command("chunk many").is_err());
        assert!(parse_form_command("remove 0").is_err());
    }

    #[test]
    fn test_parse_provider_and_filter() {
        assert_eq!(
            parse_form_command("provider OpenAI").unwrap(),
            FormCommand::Provider(ProviderKind::OpenAi)
        );
        assert!(parse_form_command("provider cohere").is_err());
        assert_eq!(parse_form_command("filter all").unwrap(), FormCommand::Filter(vec![]));
        assert_eq!(
            parse_form_command("filter party, date").unwrap(),
            FormCommand::Filter(vec!["party".to_string(), "date".to_string()])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_form_command("preset").is_err());
        assert!(parse_form_command("frobnicate").is_err());
    }

    #[test]
    fn test_apply_preset_and_remove() {
        let mut state = FormState::new(&Config::default());
        state.apply(FormCommand::Preset("legal".to_string())).unwrap();
        assert!(state.session.classes.contains(&"party".to_string()));

        let count = state.session.examples.len();
        state.apply(FormCommand::Remove(1)).unwrap();
        assert_eq!(state.session.examples.len(), count - 1);

        assert!(state.apply(FormCommand::Preset("astrology".to_string())).is_err());
    }

    #[test]
    fn test_apply_engine_options() {
        let mut state = FormState::new(&Config::default());
        state.apply(FormCommand::Passes(2)).unwrap();
        state.apply(FormCommand::Workers(8)).unwrap();
        state.apply(FormCommand::Chunk(500)).unwrap();
        state.apply(FormCommand::Provider(ProviderKind::Ollama)).unwrap();

        let options = state.run_options();
        assert_eq!(options.engine.extraction_passes, 2);
        assert_eq!(options.engine.max_workers, 8);
        assert_eq!(options.engine.max_char_buffer, 500);
        assert!(!options.engine.use_schema_constraints);
    }

    #[test]
    fn test_apply_rejects_interactive_commands() {
        let mut state = FormState::new(&Config::default());
        assert!(state.apply(FormCommand::Run).is_err());
        assert!(state.apply(FormCommand::Text(None)).is_err());
    }
}
