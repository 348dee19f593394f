mod highlighter;
mod lexer;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use nanoseed::emitter::Register;
use nanoseed::visitor::Formatter;
use nanoseed::{CompileOptions, EmitterOptions, Session, parser, render_error};
use nanoseed_harness::{HostConfig, Listing, ProcessRunner, SysFs};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::io::BufRead;
use std::io::BufReader;

/// nanoseed - initial machine state for micro-benchmarks
#[derive(Parser, Debug)]
#[command(name = "nanoseed")]
#[command(about = "Compile register and memory constraints into an x86-64 prelude", long_about = None)]
struct Args {
    /// Seed for values chosen inside ranges (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Register pointing at the top of the scratch region
    #[arg(long, default_value = "r14")]
    base: String,

    /// Alignment of scratch allocations, in bytes
    #[arg(long, default_value_t = 8)]
    granularity: u64,

    /// Size of the scratch region, in bytes
    #[arg(long)]
    scratch_size: Option<u64>,

    /// Read the scratch region size from the benchmark kernel module
    #[arg(long)]
    host: bool,

    /// Print a complete assembly listing around this snippet at the end
    #[arg(long, value_name = "SNIPPET")]
    listing: Option<String>,

    /// Bracket the listing snippet with counter start/stop markers
    #[arg(long, requires = "listing")]
    counters: bool,

    /// Print the parsed statement (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Statements to compile (if not provided, reads from stdin)
    statements: Vec<String>,
}

impl Args {
    fn compile_options(&self) -> Result<CompileOptions> {
        let mut emitter = if self.host {
            let fs = SysFs::new(ProcessRunner::detect());
            HostConfig::discover(&fs).into_diagnostic()?.emitter_options()
        } else {
            EmitterOptions {
                base_register: self.base.clone(),
                ..EmitterOptions::default()
            }
        };
        emitter.granularity = self.granularity;
        if let Some(size) = self.scratch_size {
            emitter.scratch_size = size;
        }
        Ok(CompileOptions {
            emitter,
            seed: self.seed,
        })
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let registers: Vec<String> = Register::names().map(str::to_string).collect();

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(registers);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(20)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_correct_cursor_pos(false);

    let completion_menu = Box::new(ide_menu);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let edit_mode = Box::new(Emacs::new(keybindings));

    let line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_validator(Box::new(highlighter::BracketValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(edit_mode);

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("nanoseed".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

fn compile_input(session: &mut Session, input: &str, debug_parse: bool) {
    if input.trim().is_empty() {
        return;
    }

    if debug_parse {
        if let Ok(parsed) = parser::parse(input) {
            println!("=== Parsed Statement ===");
            println!("{:#?}", parsed.expr);
            println!("{}", Formatter::format(&parsed.expr));
            println!();
        }
    }

    match session.compile(input) {
        Ok(instructions) => {
            for instruction in instructions {
                println!("{instruction}");
            }
        }
        Err(e) => render_error(input, &e),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control the log level; default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = args.compile_options()?;
    let mut session = Session::new(&options).into_diagnostic()?;

    if !args.statements.is_empty() {
        for statement in &args.statements {
            compile_input(&mut session, statement, args.debug_parse);
        }
    } else if atty::is(atty::Stream::Stdin) {
        let (mut line_editor, prompt) = setup_reedline();

        println!("nanoseed - one constraint per line (Ctrl+D or Ctrl+C to finish)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    break;
                }
            };

            match sig {
                Signal::Success(buffer) => {
                    compile_input(&mut session, &buffer, args.debug_parse);
                }
                Signal::CtrlD | Signal::CtrlC => break,
            }
        }
    } else {
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    break;
                }
            };

            compile_input(&mut session, &line, args.debug_parse);
        }
    }

    if let Some(snippet) = &args.listing {
        let listing = Listing::new()
            .prelude(session.instructions())
            .body(snippet)
            .counters(args.counters);
        print!("{listing}");
    }

    Ok(())
}
