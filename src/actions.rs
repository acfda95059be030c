use super::*;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpanderAction {
    ExpandAll,
    CollapseAll,
    ExpandAllFailed,
}

impl ExpanderAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "expand_all" => Some(Self::ExpandAll),
            "collapse_all" => Some(Self::CollapseAll),
            "expand_all_failed" => Some(Self::ExpandAllFailed),
            _ => None,
        }
    }
}

/// What a report control does when clicked, decoded from its inline
/// `onclick` handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    ToggleHash(String),
    Expander(ExpanderAction),
    ExpandThisOnly,
    DownloadEmbed { id: String, filename: String },
    ToggleDarkMode,
    FilterStatus(StatusFilter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HandlerArg {
    Str(String),
    This,
}

fn call_regex() -> Option<&'static fancy_regex::Regex> {
    static CALL: OnceLock<Option<fancy_regex::Regex>> = OnceLock::new();
    CALL.get_or_init(|| fancy_regex::Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)\s*$").ok())
        .as_ref()
}

impl ControlAction {
    pub fn parse(handler: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedHandler(handler.to_string());

        let statements = split_statements(handler)
            .into_iter()
            .filter(|stmt| !matches!(*stmt, "return false" | "return true"))
            .collect::<Vec<_>>();
        let [call] = statements.as_slice() else {
            return Err(unsupported());
        };

        let regex = call_regex().ok_or_else(unsupported)?;
        let caps = regex
            .captures(call)
            .map_err(|_| unsupported())?
            .ok_or_else(unsupported)?;
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let args = parse_args(caps.get(2).map(|m| m.as_str()).unwrap_or_default())
            .ok_or_else(unsupported)?;

        match (name, args.as_slice()) {
            ("toggle_hash", [HandlerArg::Str(id)]) => Ok(Self::ToggleHash(id.clone())),
            ("expander", [HandlerArg::Str(action), HandlerArg::This]) => {
                ExpanderAction::parse(action)
                    .map(Self::Expander)
                    .ok_or_else(unsupported)
            }
            ("expand_this_only", [HandlerArg::This]) => Ok(Self::ExpandThisOnly),
            ("download_embed", [HandlerArg::Str(id), HandlerArg::Str(filename)]) => {
                Ok(Self::DownloadEmbed {
                    id: id.clone(),
                    filename: filename.clone(),
                })
            }
            ("toggle_dark_mode", []) => Ok(Self::ToggleDarkMode),
            ("filter_status", [HandlerArg::Str(statuses)]) => {
                StatusFilter::parse(statuses).map(Self::FilterStatus)
            }
            _ => Err(unsupported()),
        }
    }
}

fn split_statements(src: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (idx, ch) in src.char_indices() {
        match (quote, ch) {
            (Some(q), _) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ';') => {
                out.push(src[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(src[start..].trim());
    out.retain(|stmt| !stmt.is_empty());
    out
}

fn parse_args(src: &str) -> Option<Vec<HandlerArg>> {
    let mut args = Vec::new();
    let chars = src.chars().collect::<Vec<_>>();
    let mut i = 0usize;

    let skip_ws = |i: &mut usize| {
        while *i < chars.len() && chars[*i].is_whitespace() {
            *i += 1;
        }
    };

    skip_ws(&mut i);
    if i >= chars.len() {
        return Some(args);
    }

    loop {
        skip_ws(&mut i);
        let ch = *chars.get(i)?;
        if ch == '\'' || ch == '"' {
            i += 1;
            let mut value = String::new();
            loop {
                let next = *chars.get(i)?;
                i += 1;
                if next == ch {
                    break;
                }
                if next == '\\' {
                    value.push(*chars.get(i)?);
                    i += 1;
                    continue;
                }
                value.push(next);
            }
            args.push(HandlerArg::Str(value));
        } else if chars[i..].starts_with(&['t', 'h', 'i', 's']) {
            i += 4;
            args.push(HandlerArg::This);
        } else {
            return None;
        }

        skip_ws(&mut i);
        match chars.get(i) {
            None => return Some(args),
            Some(',') => i += 1,
            Some(_) => return None,
        }
    }
}
