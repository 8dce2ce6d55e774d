use crate::model::{LogEntry, ParseFailure, ParseFailureReason};
use crate::parse::query::parse_query;
use chrono::{DateTime, NaiveDateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const TIMESTAMP_LEN: usize = "2025-01-01T00:00:00Z".len();

/// Parses one raw log line. Total: every input yields an entry or a failure.
pub fn parse_line(line: &str) -> Result<LogEntry, ParseFailure> {
    parse_line_detailed(line)
        .map(|parsed| parsed.entry)
        .map_err(|reason| ParseFailure::new(reason, line.trim_end()))
}

/// A parsed entry plus the recoverable issues found while building it.
pub(crate) struct ParsedEntry {
    pub entry: LogEntry,
    pub query_malformed: bool,
}

pub(crate) fn parse_line_detailed(line: &str) -> Result<ParsedEntry, ParseFailureReason> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseFailureReason::FieldCountMismatch);
    }

    let (priority, rest) = split_priority(line)?;

    // The timestamp follows the closing '>' directly.
    if rest.starts_with(char::is_whitespace) {
        return Err(ParseFailureReason::FieldCountMismatch);
    }

    let tokens = tokenize(rest).ok_or(ParseFailureReason::FieldCountMismatch)?;
    let fields = match_fields(&tokens).ok_or(ParseFailureReason::FieldCountMismatch)?;

    let timestamp = parse_timestamp(fields.timestamp)?;
    let (method, target) = split_request(fields.request)?;

    let (path, query_string) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    if path.is_empty() {
        return Err(ParseFailureReason::BadRequestLine);
    }

    let status_code = fields
        .status
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
        .ok_or(ParseFailureReason::BadStatusOrSize)?;

    let response_size = fields
        .size
        .parse::<u64>()
        .map_err(|_| ParseFailureReason::BadStatusOrSize)?;

    let query = parse_query(query_string);

    Ok(ParsedEntry {
        entry: LogEntry {
            priority,
            timestamp,
            cache_server: fields.host.to_string(),
            client_ip: fields.client_ip.to_string(),
            http_method: method.to_string(),
            path: path.to_string(),
            query_string: query_string.to_string(),
            query_params: query.params,
            status_code,
            response_size,
            user_agent: fields.user_agent.to_string(),
            cache_status: fields.cache_status.to_string(),
        },
        query_malformed: query.malformed,
    })
}

fn split_priority(line: &str) -> Result<(u32, &str), ParseFailureReason> {
    let inner = line
        .strip_prefix('<')
        .ok_or(ParseFailureReason::BadPriority)?;
    let (digits, rest) = inner
        .split_once('>')
        .ok_or(ParseFailureReason::BadPriority)?;

    // `u32::from_str` accepts a leading '+', the grammar does not.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseFailureReason::BadPriority);
    }

    let priority = digits
        .parse::<u32>()
        .map_err(|_| ParseFailureReason::BadPriority)?;

    Ok((priority, rest))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseFailureReason> {
    // Length check rejects fractional seconds and offsets that chrono would
    // otherwise tolerate around the literal `Z`.
    if raw.len() != TIMESTAMP_LEN {
        return Err(ParseFailureReason::BadTimestamp);
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseFailureReason::BadTimestamp)
}

fn split_request(request: &str) -> Result<(&str, &str), ParseFailureReason> {
    let mut parts = request.split_whitespace();

    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(ParseFailureReason::BadRequestLine);
    };

    // Optional protocol token, nothing after it.
    let _protocol = parts.next();
    if parts.next().is_some() {
        return Err(ParseFailureReason::BadRequestLine);
    }

    if !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseFailureReason::BadRequestLine);
    }

    Ok((method, target))
}

//-----------------------------------------------------------------------------
// Tokenizing
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Bare(&'a str),
    Quoted(&'a str),
}

/// Splits on whitespace while keeping quoted runs intact.
///
/// Returns `None` for an unterminated quote or a quote glued to a bare token.
fn tokenize(input: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::with_capacity(16);
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('"') {
            let end = after.find('"')?;
            tokens.push(Token::Quoted(&after[..end]));
            rest = &after[end + 1..];

            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                return None;
            }
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '"')
                .unwrap_or(rest.len());

            if rest[end..].starts_with('"') {
                return None;
            }

            tokens.push(Token::Bare(&rest[..end]));
            rest = &rest[end..];
        }

        rest = rest.trim_start();
    }

    Some(tokens)
}

struct Fields<'a> {
    timestamp: &'a str,
    host: &'a str,
    client_ip: &'a str,
    request: &'a str,
    status: &'a str,
    size: &'a str,
    user_agent: &'a str,
    cache_status: &'a str,
}

fn match_fields<'a>(tokens: &[Token<'a>]) -> Option<Fields<'a>> {
    use Token::{Bare, Quoted};

    let (head, tail) = tokens.split_at_checked(6)?;

    let [
        Bare(timestamp),
        Bare(host),
        Bare(process),
        Bare(client_ip),
        Quoted(_),
        Quoted(_),
    ] = head
    else {
        return None;
    };

    if !is_process_tag(process) {
        return None;
    }

    // The HTTP date is unquoted and spans several bare tokens.
    let [
        date @ ..,
        Quoted(request),
        Bare(status),
        Bare(size),
        Quoted(_),
        Quoted(user_agent),
        Bare(cache_status),
    ] = tail
    else {
        return None;
    };

    if date.is_empty() || !date.iter().all(|t| matches!(t, Bare(_))) {
        return None;
    }

    Some(Fields {
        timestamp: *timestamp,
        host: *host,
        client_ip: *client_ip,
        request: *request,
        status: *status,
        size: *size,
        user_agent: *user_agent,
        cache_status: *cache_status,
    })
}

/// `name[pid]:` with a non-empty name and a decimal pid.
fn is_process_tag(token: &str) -> bool {
    let Some((name, pid)) = token
        .strip_suffix("]:")
        .and_then(|inner| inner.rsplit_once('['))
    else {
        return false;
    };

    !name.is_empty() && !pid.is_empty() && pid.bytes().all(|b| b.is_ascii_digit())
}
