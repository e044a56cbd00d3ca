//! `cloak`: hide payloads in text, and read them back.
//!
//! ```text
//! cloak encode --visible "Hello World" --original Hello --code X1 --reward-text prize
//! cloak decode --code X1 < carrier.txt
//! cloak digest X1
//! ```

mod config;
mod logging;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand, ValueEnum};
use prompt_cloak::{
    encode, escape_invisible, unescape_invisible, AccessVerifier, Disclosure, FixedClock,
    FixedLocation, GeoPoint, Observation, PayloadBuilder, Reward, SystemClock, UnlockError,
    Unlocker,
};
use serde_json::{json, Value};

use crate::config::Settings;

/// Exit status when a claim code or password is rejected.
const EXIT_ACCESS_DENIED: u8 = 3;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogOutputFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `{"cipherText": ...}`
    Json,
    /// The carrier text alone
    Plain,
}

/// Command line arguments.
#[derive(Debug, Parser)]
#[clap(name = "cloak", version, about = "Hide payloads inside visible text")]
struct CloakArgs {
    /// Optional path to a TOML configuration file. Settings may also be
    /// given as CLOAK_* environment variables.
    #[clap(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[clap(short = 'o', long = "log-format", default_value = "pretty", global = true)]
    log_format: LogOutputFormat,

    /// Log codec stages at debug level.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Embed a payload into visible text.
    Encode(EncodeArgs),
    /// Read and unlock a payload from carrier text.
    Decode(DecodeArgs),
    /// Print the access digest of a claim code.
    Digest { code: String },
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Text the carrier shows.
    #[clap(long)]
    visible: String,

    /// Surface text stored in the payload; defaults to --visible.
    #[clap(long)]
    original: Option<String>,

    /// Claim code that unlocks the payload. Repeatable.
    #[clap(long = "code")]
    codes: Vec<String>,

    /// Single password; stored as a digest unless --keep-legacy-password.
    #[clap(long)]
    password: Option<String>,

    /// Store --password in clear for legacy decoders.
    #[clap(long, requires = "password")]
    keep_legacy_password: bool,

    /// Latitude of the geo constraint, in degrees.
    #[clap(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the geo constraint, in degrees.
    #[clap(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Time constraint: an RFC 3339 timestamp, or `now` when given bare.
    #[clap(long, num_args = 0..=1, default_missing_value = "now")]
    time_lock: Option<String>,

    /// Text reward revealed on unlock.
    #[clap(long, conflicts_with = "reward_image")]
    reward_text: Option<String>,

    /// File holding a data-URI image reward.
    #[clap(long)]
    reward_image: Option<PathBuf>,

    #[clap(long, default_value = "json")]
    format: OutputFormat,

    /// Also return the carrier with invisible characters spelled as \uXXXX.
    #[clap(long)]
    escape: bool,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Carrier text; read from --input or stdin when absent.
    #[clap(long, conflicts_with = "input")]
    text: Option<String>,

    /// File holding the carrier text; `-` for stdin.
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Claim code (or legacy password).
    #[clap(long)]
    code: Option<String>,

    /// Observed latitude, in degrees.
    #[clap(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Observed longitude, in degrees.
    #[clap(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Reported accuracy of the observed location, in metres.
    #[clap(long, default_value_t = 0.0)]
    accuracy: f64,

    /// Evaluate the time constraint at this RFC 3339 instant instead of now.
    #[clap(long)]
    at: Option<String>,
}

fn main() -> Result<ExitCode, anyhow::Error> {
    let args = CloakArgs::parse();

    let directives = if args.verbose { "info,prompt_cloak=debug" } else { "warn" };
    logging::setup_logging(directives, matches!(args.log_format, LogOutputFormat::Pretty));

    let settings = Settings::new(args.config.as_ref()).context("failed to load configuration")?;
    tracing::debug!(?settings, "configuration loaded");

    match args.command {
        Command::Encode(encode_args) => {
            let out = run_encode(&settings.verifier(), &encode_args)?;
            println!("{out}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Decode(decode_args) => {
            let (body, status) = run_decode(&settings.unlocker(), &decode_args)?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(status)
        }
        Command::Digest { code } => {
            println!("{}", settings.verifier().digest(&code)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_epoch_ms(value: &str) -> anyhow::Result<i64> {
    if value.eq_ignore_ascii_case("now") {
        return Ok(chrono::Utc::now().timestamp_millis());
    }
    let instant = chrono::DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid RFC 3339 timestamp: {value}"))?;
    Ok(instant.timestamp_millis())
}

fn run_encode(verifier: &AccessVerifier, args: &EncodeArgs) -> anyhow::Result<String> {
    let original = args.original.clone().unwrap_or_else(|| args.visible.clone());
    let mut builder = PayloadBuilder::new(verifier, original).access_codes(&args.codes)?;

    if let Some(password) = &args.password {
        builder = if args.keep_legacy_password {
            builder.keep_legacy_password(password.as_str())
        } else {
            builder.legacy_password(password.as_str())
        };
    }
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        builder = builder.geo_constraint(GeoPoint::new(lat, lng));
    }
    if let Some(time_lock) = &args.time_lock {
        builder = builder.time_constraint(parse_epoch_ms(time_lock)?);
    }
    if let Some(text) = &args.reward_text {
        builder = builder.reward(Reward::text(text.as_str()))?;
    }
    if let Some(path) = &args.reward_image {
        let data_uri = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let data_uri = data_uri.trim();
        if !data_uri.starts_with("data:image/") {
            bail!("{} does not hold a data:image/ URI", path.display());
        }
        builder = builder.reward(Reward::image(data_uri))?;
    }

    let payload = builder.build()?;
    let carrier = encode(&args.visible, &payload)?;
    tracing::info!(
        locked = payload.is_locked(),
        geo = payload.geo_constraint().is_some(),
        time = payload.time_constraint().is_some(),
        "payload embedded"
    );

    if args.format == OutputFormat::Plain {
        return Ok(carrier);
    }
    let body = if args.escape {
        json!({ "cipherText": carrier, "cipherTextEscaped": escape_invisible(&carrier) })
    } else {
        json!({ "cipherText": carrier })
    };
    Ok(body.to_string())
}

fn read_carrier(args: &DecodeArgs) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    let mut buf = String::new();
    match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            buf = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        _ => {
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
        }
    }
    Ok(buf)
}

fn run_decode(unlocker: &Unlocker, args: &DecodeArgs) -> anyhow::Result<(Value, ExitCode)> {
    let carrier = unescape_invisible(&read_carrier(args)?);
    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Observation::new(lat, lng, args.accuracy)),
        _ => None,
    };
    let sensor = FixedLocation(location);

    let result = match &args.at {
        Some(at) => {
            let clock = FixedClock(parse_epoch_ms(at)?);
            unlocker.unlock_with(&carrier, args.code.as_deref(), &clock, &sensor)
        }
        None => unlocker.unlock_with(&carrier, args.code.as_deref(), &SystemClock, &sensor),
    };

    match result {
        Ok(disclosure) => Ok((render_disclosure(&disclosure), ExitCode::SUCCESS)),
        Err(UnlockError::AccessDenied) => Ok((
            json!({ "error": "Invalid Claim Code", "locked": true }),
            ExitCode::from(EXIT_ACCESS_DENIED),
        )),
        Err(e) => Err(e.into()),
    }
}

fn render_disclosure(disclosure: &Disclosure) -> Value {
    match disclosure {
        Disclosure::NoPayload => json!({ "payload": null }),
        Disclosure::Corrupt { error } => json!({
            "payload": null,
            "corrupt": true,
            "code": error.code().code(),
            "error": error.to_string(),
        }),
        Disclosure::Locked {
            original,
            geo_locked,
            time_locked,
        } => json!({
            "payload": {
                "locked": true,
                "requiresAuth": true,
                "o": original,
                "geoLocked": geo_locked,
                "timeLocked": time_locked,
            }
        }),
        Disclosure::Restricted { original, reason, .. } => json!({
            "payload": {
                "locked": false,
                "granted": false,
                "o": original,
                "reason": reason,
            }
        }),
        Disclosure::Unlocked {
            original,
            reward,
            legacy_password,
        } => json!({
            "payload": {
                "locked": false,
                "granted": true,
                "o": original,
                "p": legacy_password,
                "reward": reward,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CloakArgs {
        CloakArgs::try_parse_from(argv).unwrap()
    }

    fn encode_args(argv: &[&str]) -> EncodeArgs {
        let mut full = vec!["cloak", "encode"];
        full.extend_from_slice(argv);
        match parse(&full).command {
            Command::Encode(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn decode_args(argv: &[&str]) -> DecodeArgs {
        let mut full = vec!["cloak", "decode"];
        full.extend_from_slice(argv);
        match parse(&full).command {
            Command::Decode(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn encode_plain(argv: &[&str]) -> String {
        let mut full = argv.to_vec();
        full.extend_from_slice(&["--format", "plain"]);
        run_encode(&AccessVerifier::sha256(), &encode_args(&full)).unwrap()
    }

    #[test]
    fn test_encode_json_with_escape() {
        let out = run_encode(
            &AccessVerifier::sha256(),
            &encode_args(&["--visible", "Hi", "--escape"]),
        )
        .unwrap();
        let body: Value = serde_json::from_str(&out).unwrap();
        let carrier = body["cipherText"].as_str().unwrap();
        let escaped = body["cipherTextEscaped"].as_str().unwrap();
        assert!(carrier.starts_with("Hi"));
        assert_eq!(unescape_invisible(escaped), carrier);
    }

    #[test]
    fn test_claim_code_flow() {
        let carrier = encode_plain(&[
            "--visible", "Hello World", "--original", "Hello", "--code", "X1", "--reward-text",
            "prize",
        ]);
        let unlocker = Unlocker::default();

        let (locked, status) = run_decode(&unlocker, &decode_args(&["--text", &carrier])).unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
        assert_eq!(locked["payload"]["locked"], json!(true));
        assert_eq!(locked["payload"]["o"], json!("Hello"));
        assert!(locked["payload"].get("reward").is_none());

        let (open, _) =
            run_decode(&unlocker, &decode_args(&["--text", &carrier, "--code", "X1"])).unwrap();
        assert_eq!(open["payload"]["granted"], json!(true));
        assert_eq!(open["payload"]["reward"]["content"], json!("prize"));

        let (denied, status) =
            run_decode(&unlocker, &decode_args(&["--text", &carrier, "--code", "wrong"])).unwrap();
        assert_eq!(status, ExitCode::from(EXIT_ACCESS_DENIED));
        assert_eq!(denied["locked"], json!(true));
    }

    #[test]
    fn test_escaped_input_is_normalized() {
        let carrier = encode_plain(&["--visible", "Hi", "--reward-text", "r"]);
        let escaped = escape_invisible(&carrier);
        let (body, _) = run_decode(&Unlocker::default(), &decode_args(&["--text", &escaped])).unwrap();
        assert_eq!(body["payload"]["reward"]["content"], json!("r"));
    }

    #[test]
    fn test_time_lock_and_geo_flags() {
        let carrier = encode_plain(&[
            "--visible", "Hi", "--time-lock", "2025-01-01T12:00:00Z", "--lat", "-33.86", "--lng",
            "151.21",
        ]);
        let unlocker = Unlocker::default();

        let (late, _) = run_decode(
            &unlocker,
            &decode_args(&[
                "--text", &carrier, "--at", "2025-01-01T14:00:00Z", "--lat", "-33.86", "--lng",
                "151.21",
            ]),
        )
        .unwrap();
        assert_eq!(late["payload"]["granted"], json!(false));

        let (lost, _) = run_decode(
            &unlocker,
            &decode_args(&["--text", &carrier, "--at", "2025-01-01T12:30:00Z"]),
        )
        .unwrap();
        assert_eq!(lost["payload"]["granted"], json!(false));

        let (ok, _) = run_decode(
            &unlocker,
            &decode_args(&[
                "--text", &carrier, "--at", "2025-01-01T12:30:00+00:00", "--lat", "-33.86",
                "--lng", "151.21",
            ]),
        )
        .unwrap();
        assert_eq!(ok["payload"]["granted"], json!(true));
    }

    #[test]
    fn test_nan_location_is_restricted() {
        let carrier = encode_plain(&["--visible", "Hi", "--lat", "1.0", "--lng", "2.0", "--reward-text", "r"]);
        let (body, _) = run_decode(
            &Unlocker::default(),
            &decode_args(&["--text", &carrier, "--lat", "NaN", "--lng", "NaN"]),
        )
        .unwrap();
        assert_eq!(body["payload"]["granted"], json!(false));
        assert!(body["payload"].get("reward").is_none());
    }

    #[test]
    fn test_plain_text_has_no_payload() {
        let (body, _) =
            run_decode(&Unlocker::default(), &decode_args(&["--text", "nothing here"])).unwrap();
        assert_eq!(body, json!({ "payload": null }));
    }

    #[test]
    fn test_bare_time_lock_means_now() {
        let args = encode_args(&["--visible", "Hi", "--time-lock"]);
        assert_eq!(args.time_lock.as_deref(), Some("now"));
        assert!(parse_epoch_ms("now").unwrap() > 0);
        assert!(parse_epoch_ms("yesterday").is_err());
    }
}
