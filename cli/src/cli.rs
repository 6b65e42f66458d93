//! Command-line arguments for `push-helper`.

use clap::{ArgAction, Args, Parser, Subcommand};
use push_helper_core::{Device, Message, Recipients, UserData};

/// Talk to a push notification service from the shell.
#[derive(Parser, Debug)]
#[command(
    name = "push-helper",
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Push service root URL, e.g. http://push-service.example.com
    #[arg(long, env = "PUSH_SERVICE_API_ROOT")]
    pub api_root: String,

    /// Application name registered with the push service
    #[arg(long, env = "PUSH_SERVICE_APP_NAME")]
    pub app_name: String,

    /// Give up on a request after this many seconds
    #[arg(long, env = "PUSH_SERVICE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user, or update its locale and add a device
    UpsertUser(UpsertUserArgs),

    /// Delete a user and all of its devices
    DeleteUser {
        user_id: String,
    },

    /// Remove one device from a user
    DeleteDevice {
        user_id: String,
        token: String,
    },

    /// Send a notification to one or more users
    Send(SendArgs),

    /// Send a notification to every user of the application
    SendAll(MessageArgs),
}

#[derive(Args, Debug)]
pub struct UpsertUserArgs {
    /// Existing or desired user id; omit to let the service assign one
    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub locale: String,

    /// Device platform, e.g. ios or android
    #[arg(long, requires = "device_token")]
    pub device_type: Option<String>,

    #[arg(long, requires = "device_type")]
    pub device_token: Option<String>,
}

impl UpsertUserArgs {
    pub fn user_data(&self) -> UserData {
        let device = match (&self.device_type, &self.device_token) {
            (Some(kind), Some(token)) => Some(Device::new(kind.as_str(), token.as_str())),
            _ => None,
        };
        UserData {
            locale: self.locale.clone(),
            device,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Target user id; repeat for several users
    #[arg(long = "user", required = true)]
    pub users: Vec<String>,

    #[command(flatten)]
    pub message: MessageArgs,
}

impl SendArgs {
    pub fn recipients(&self) -> Recipients {
        match self.users.as_slice() {
            [single] => Recipients::One(single.clone()),
            many => Recipients::Many(many.to_vec()),
        }
    }
}

#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Same text for every locale
    #[arg(long, conflicts_with = "localized", required_unless_present = "localized")]
    pub text: Option<String>,

    /// Per-locale text as LOCALE=TEXT; repeat for several locales
    #[arg(long, value_parser = parse_locale_text)]
    pub localized: Vec<(String, String)>,
}

impl MessageArgs {
    pub fn message(&self) -> Message {
        match &self.text {
            Some(text) => Message::Text(text.clone()),
            None => Message::localized(self.localized.iter().cloned()),
        }
    }
}

fn parse_locale_text(raw: &str) -> Result<(String, String), String> {
    let (locale, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LOCALE=TEXT, got {raw:?}"))?;
    if locale.is_empty() {
        return Err(format!("missing locale in {raw:?}"));
    }
    Ok((locale.to_string(), text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = ["push-helper", "--api-root", "http://localhost:3000", "--app-name", "demo"];
        Cli::try_parse_from(base.into_iter().chain(args.iter().copied()))
    }

    #[test]
    fn send_to_single_user_is_a_bare_recipient() {
        let cli = parse(&["send", "--user", "u1", "--text", "hi"]).unwrap();
        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.recipients(), Recipients::One("u1".to_string()));
        assert_eq!(args.message.message(), Message::from("hi"));
    }

    #[test]
    fn send_to_many_users_with_localized_text() {
        let cli = parse(&[
            "send",
            "--user",
            "u1",
            "--user",
            "u2",
            "--localized",
            "en=hi",
            "--localized",
            "tr=merhaba",
        ])
        .unwrap();
        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.recipients(), Recipients::from(["u1", "u2"]));
        assert_eq!(args.message.message(), Message::localized([("en", "hi"), ("tr", "merhaba")]));
    }

    #[test]
    fn send_all_requires_a_message() {
        assert!(parse(&["send-all"]).is_err());
        assert!(parse(&["send-all", "--text", "a", "--localized", "en=b"]).is_err());
    }

    #[test]
    fn localized_text_needs_a_locale() {
        assert!(parse(&["send-all", "--localized", "=hi"]).is_err());
        assert!(parse(&["send-all", "--localized", "hi"]).is_err());
    }

    #[test]
    fn upsert_user_device_flags_go_together() {
        assert!(parse(&["upsert-user", "--locale", "en", "--device-type", "ios"]).is_err());

        let cli = parse(&[
            "upsert-user",
            "--user-id",
            "u1",
            "--locale",
            "en",
            "--device-type",
            "ios",
            "--device-token",
            "XXX",
        ])
        .unwrap();
        let Command::UpsertUser(args) = cli.command else {
            panic!("expected upsert-user");
        };
        assert_eq!(args.user_id.as_deref(), Some("u1"));
        assert_eq!(args.user_data().device, Some(Device::new("ios", "XXX")));
    }

    #[test]
    fn verbosity_counts() {
        let cli = parse(&["-vv", "delete-user", "u1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
