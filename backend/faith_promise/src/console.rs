//! Line-oriented front-end for the pledge form.
//!
//! Each command fills in one field and leaves it (so its error, if any,
//! becomes visible), mirroring type-then-blur in a graphical form.

use std::fmt::Write as _;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::controller::{Phase, SubmissionController, SubmitOutcome, SUCCESS_BODY, SUCCESS_TITLE};
use crate::errors::Result;
use crate::form::{Field, FileRef, PaymentMethod};
use crate::sink::SubmissionSink;

const TRANSFER_ACCOUNT: &str = "Transfer ke rekening BCA 7305025445 a/n GBI ALTAR FILADELFIA.";
const TRANSFER_UNIQUE_CODE: &str =
    "Jangan lupa untuk menambahkan Rp 1 sebagai kode unik (Contoh: Rp. 100.000 menjadi Rp. 100.001)";

const HELP: &str = "\
Perintah:
  name <teks>              Nama Lengkap
  amount <angka>           Janji Iman, misal 100.000
  method cash|transfer     Metode Pembayaran
  proof <path>             Bukti Transfer (hanya untuk transfer)
  blur <field>             tandai field sudah disentuh
  submit                   kirim formulir
  show                     tampilkan formulir
  help                     bantuan ini
  quit                     keluar
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Name(String),
    Amount(String),
    Method(PaymentMethod),
    Proof(FileRef),
    Blur(Field),
    Submit,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name(rest.to_string())),
            "amount" => Ok(Self::Amount(rest.to_string())),
            "method" => rest.parse().map(Self::Method),
            "proof" if rest.is_empty() => Err("proof needs a file path".to_string()),
            "proof" => Ok(Self::Proof(FileRef::new(rest))),
            "blur" => rest.parse().map(Self::Blur),
            "submit" => Ok(Self::Submit),
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try `help`)")),
        }
    }
}

/// Render the current view: the success message, or the form with the
/// errors of touched fields.
pub fn render<S: SubmissionSink>(c: &SubmissionController<S>) -> String {
    let mut out = String::new();

    if c.phase() == Phase::Success {
        let _ = writeln!(out, "✔ {SUCCESS_TITLE}");
        let _ = writeln!(out, "  {SUCCESS_BODY}");
        return out;
    }

    let data = c.data();
    let errors = c.visible_errors();
    let row = |out: &mut String, field: Field, value: &str| {
        let _ = writeln!(out, "{}: {}", field.label(), value);
        if let Some(msg) = errors.get(field) {
            let _ = writeln!(out, "  ! {msg}");
        }
    };

    let _ = writeln!(out, "── Form Janji Iman ──");
    row(&mut out, Field::FullName, &data.full_name);
    row(&mut out, Field::FaithPromise, &c.display_amount());
    row(
        &mut out,
        Field::PaymentMethod,
        data.payment_method.map(|m| m.as_str()).unwrap_or("-"),
    );

    if c.proof_visible() {
        let _ = writeln!(out, "  {TRANSFER_ACCOUNT}");
        let _ = writeln!(out, "  {TRANSFER_UNIQUE_CODE}");
        let proof = data
            .proof_of_transfer
            .as_ref()
            .map(FileRef::file_name)
            .unwrap_or_else(|| "-".to_string());
        row(&mut out, Field::ProofOfTransfer, &proof);
    }

    if let Some(e) = c.submission_error() {
        let _ = writeln!(out, "! {e}");
    }
    let _ = writeln!(
        out,
        "[Submit]{}",
        if c.is_valid() { "" } else { " (belum lengkap)" }
    );
    out
}

/// Apply one command and return the text to print. `None` means shutdown
/// arrived while a submission was in flight.
async fn apply<S: SubmissionSink>(
    c: &mut SubmissionController<S>,
    command: Command,
    shutdown: &CancellationToken,
) -> Option<String> {
    match command {
        Command::Name(v) => {
            c.input_full_name(&v);
            c.blur(Field::FullName);
        }
        Command::Amount(v) => {
            c.input_faith_promise(&v);
            c.blur(Field::FaithPromise);
        }
        Command::Method(m) => {
            c.select_payment_method(m);
            c.blur(Field::PaymentMethod);
        }
        Command::Proof(file) => {
            if !c.proof_visible() {
                return Some("Bukti Transfer hanya untuk metode Transfer.\n".to_string());
            }
            c.attach_proof(file);
        }
        Command::Blur(field) => c.blur(field),
        Command::Submit => {
            if let SubmitOutcome::Ignored = c.submit_or_cancel(shutdown).await? {
                return Some("Formulir sedang direset, tunggu sebentar.\n".to_string());
            }
        }
        Command::Show => {}
        Command::Help => return Some(HELP.to_string()),
        Command::Quit => {}
    }
    Some(render(c))
}

/// Drive the form from stdin until EOF, `quit`, or shutdown.
pub async fn run<S: SubmissionSink>(
    controller: SubmissionController<S>,
    shutdown: CancellationToken,
) -> Result<()> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    run_with(controller, input, tokio::io::stdout(), shutdown).await
}

pub async fn run_with<S, R, W>(
    mut controller: SubmissionController<S>,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: SubmissionSink,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(render(&controller).as_bytes()).await?;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Console stopping on shutdown");
                break;
            }
            _ = controller.wait_for_reset() => {
                output.write_all(render(&controller).as_bytes()).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let text = match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => match apply(&mut controller, command, &shutdown).await {
                        Some(text) => text,
                        None => break,
                    },
                    Err(e) => format!("{e}\n"),
                };
                output.write_all(text.as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    controller.shutdown();
    Ok(())
}
