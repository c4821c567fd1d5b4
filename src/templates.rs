use crate::models::Release;

/// Telegram rejects text messages longer than this many characters.
const MESSAGE_LIMIT: usize = 4096;
const OVERFLOW_RESERVE: usize = 32;

/// Renders the channel announcement for a release in Telegram's legacy
/// Markdown dialect.
pub fn release_message(release: &Release) -> String {
    let mut out = format!(
        "*New Movie Release*\n\nMovie: {} (Released on: {})",
        escape_markdown(&release.title),
        release.release_time.strftime("%Y-%m-%d %H:%M:%S"),
    );

    if !release.poster.is_empty() {
        out.push_str(&format!("\n\n[View Details]({})", release.poster));
    }

    if release.torrents.is_empty() {
        return out;
    }

    out.push('\n');
    let mut len = out.chars().count();
    let total = release.torrents.len();

    for (i, torrent) in release.torrents.iter().enumerate() {
        let line = format!("\n• [{}]({})", escape_markdown(&torrent.file_name), torrent.torrent_link);
        let line_len = line.chars().count();
        let remaining = total - i;
        let reserve = if remaining > 1 { OVERFLOW_RESERVE } else { 0 };

        if len + line_len + reserve > MESSAGE_LIMIT {
            out.push_str(&format!("\n…and {remaining} more"));
            break;
        }

        out.push_str(&line);
        len += line_len;
    }

    out
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
