//! HTML directory listings.

use std::path::Path;

use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::io::AsyncWrite;

use crate::handler::HandlerError;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

/// Bytes escaped when an entry name becomes a path segment in an href.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub async fn handle<W>(
    writer: &mut ResponseWriter<'_, W>,
    request: &Request,
    dir: &Path,
) -> Result<StatusCode, HandlerError>
where
    W: AsyncWrite + Unpin,
{
    let names = list_entries(dir).await.map_err(|source| HandlerError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    let body = render_listing(&request.uri, &names);
    writer
        .send(&Response::html(StatusCode::Ok, body))
        .await?;
    Ok(StatusCode::Ok)
}

/// Names of the entries in `dir`, sorted lexicographically.
pub async fn list_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Renders `names` as an HTML list of links relative to `uri`.
///
/// A `..` link leads the list for every directory except the root.
pub fn render_listing(uri: &str, names: &[String]) -> String {
    let prefix = uri.trim_end_matches('/');
    let parent = (!prefix.is_empty()).then_some("..");

    let mut body = String::from("<ul>\n");
    for name in parent.into_iter().chain(names.iter().map(String::as_str)) {
        if name == "." {
            continue;
        }
        let href = format!("{prefix}/{}", utf8_percent_encode(name, SEGMENT));
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_double_quoted_attribute(&href),
            encode_text(name)
        ));
    }
    body.push_str("</ul>\n");
    body
}
