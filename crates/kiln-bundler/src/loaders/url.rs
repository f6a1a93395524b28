use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::Value;

use super::{Content, EmittedFile, Loader, LoaderContext};
use crate::HASH_LENGTH;

fn default_name() -> String {
    "[name].[hash:8].[ext]".to_string()
}

/// Inlines small files as data URIs and emits larger ones under a hashed name.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlLoader {
    /// Files strictly smaller than this many bytes are inlined. Without a
    /// limit every file is emitted.
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    output_path: String,
    #[serde(default = "default_name")]
    name: String,
}

impl UrlLoader {
    pub fn new(limit: Option<usize>, output_path: impl Into<String>) -> Self {
        Self {
            limit,
            output_path: output_path.into(),
            name: default_name(),
        }
    }

    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        if options.is_null() {
            return Ok(Self::new(None, ""));
        }
        Ok(serde_json::from_value(options.clone())?)
    }

    fn file_name(&self, stem: &str, ext: &str, bytes: &[u8]) -> String {
        let name = interpolate_name(&self.name, stem, ext, bytes);
        let dir = self.output_path.trim_matches('/');
        if dir.is_empty() {
            name
        } else {
            format!("{}/{}", dir, name)
        }
    }
}

/// Expand `[name]`, `[ext]`, `[hash]`, `[contenthash]` and their `:N` forms.
pub(crate) fn interpolate_name(template: &str, stem: &str, ext: &str, bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes).to_hex().to_string();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find(']') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let token = &rest[start + 1..start + len];
        let (key, width) = match token.split_once(':') {
            Some((key, width)) => (key, width.parse::<usize>().ok()),
            None => (token, None),
        };
        match key {
            "name" => out.push_str(stem),
            "ext" => out.push_str(ext),
            "hash" | "contenthash" => {
                let width = width.unwrap_or(HASH_LENGTH).min(hash.len());
                out.push_str(&hash[..width]);
            }
            _ => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

pub(crate) fn mime_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

impl Loader for UrlLoader {
    fn name(&self) -> &str {
        "url"
    }

    fn transform(&self, input: Content, cx: &LoaderContext<'_>) -> anyhow::Result<Content> {
        let bytes = input.into_bytes()?;
        let ext = cx.module.id.extension().unwrap_or_default();

        if self.limit.is_some_and(|limit| bytes.len() < limit) {
            let url = format!("data:{};base64,{}", mime_type(ext), BASE64.encode(&bytes));
            return Ok(Content::Url { url, file: None });
        }

        let file_name = self.file_name(cx.module.id.file_stem(), ext, &bytes);
        Ok(Content::Url {
            url: file_name.clone(),
            file: Some(EmittedFile {
                file_name,
                source: bytes,
            }),
        })
    }
}
