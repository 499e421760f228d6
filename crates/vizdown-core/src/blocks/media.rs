/*
 * blocks/media.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Images, videos and iframes.
 */

//! Media blocks.
//!
//! Videos hosted on YouTube or Vimeo are embedded through the host's player
//! iframe; any other URL becomes a plain `<video>` element.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup::{escape_html, escape_markdown, escape_url, quote_attr};
use crate::spec::Node;

/// YouTube watch, short and embed URLs. Group 1 is the video id.
static YOUTUBE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{6,})",
    )
    .expect("Invalid regex pattern for YouTube URLs")
});

/// Vimeo URLs. Group 1 is the numeric video id.
static VIMEO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("Invalid regex pattern for Vimeo URLs")
});

/// Video hosts with an embeddable player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoHost {
    YouTube(String),
    Vimeo(String),
}

impl VideoHost {
    pub fn detect(url: &str) -> Option<Self> {
        if let Some(caps) = YOUTUBE_PATTERN.captures(url) {
            return Some(VideoHost::YouTube(caps[1].to_string()));
        }
        VIMEO_PATTERN
            .captures(url)
            .map(|caps| VideoHost::Vimeo(caps[1].to_string()))
    }

    pub fn embed_url(&self) -> String {
        match self {
            VideoHost::YouTube(id) => format!("https://www.youtube.com/embed/{}", id),
            VideoHost::Vimeo(id) => format!("https://player.vimeo.com/video/{}", id),
        }
    }
}

fn size_text(node: &Node, key: &str) -> Option<String> {
    node.param(key).map(|v| match v {
        vizdown_rexpr::RValue::Int(px) => format!("{}px", px),
        other => other.display_text(),
    })
}

pub fn render_image(node: &Node) -> Vec<String> {
    let Some(src) = node.text_param("src") else {
        tracing::warn!("image block without src");
        return Vec::new();
    };
    let caption = node.str_param("caption").unwrap_or("");

    let mut attrs = Vec::new();
    if let Some(alt) = node.text_param("alt") {
        attrs.push(format!("fig-alt={}", quote_attr(alt)));
    }
    for key in ["width", "height"] {
        if let Some(size) = size_text(node, key) {
            attrs.push(format!("{}={}", key, quote_attr(&size)));
        }
    }
    if let Some(align) = node.text_param("align") {
        attrs.push(format!("fig-align={}", quote_attr(align)));
    }

    let mut image = format!("![{}]({})", escape_markdown(caption), escape_url(src));
    if !attrs.is_empty() {
        image.push_str(&format!("{{{}}}", attrs.join(" ")));
    }
    if let Some(link) = node.text_param("link") {
        image = format!("[{}]({})", image, escape_url(link));
    }
    vec![image]
}

pub fn render_video(node: &Node) -> Vec<String> {
    let Some(url) = node.text_param("url").or_else(|| node.text_param("src")) else {
        tracing::warn!("video block without url");
        return Vec::new();
    };
    let width = size_text(node, "width").unwrap_or_else(|| "100%".to_string());
    let height = size_text(node, "height").unwrap_or_else(|| "400px".to_string());

    let mut lines = vec!["```{=html}".to_string()];
    match VideoHost::detect(url) {
        Some(host) => lines.push(format!(
            "<iframe src={} width={} height={} frameborder=\"0\" allow=\"autoplay; fullscreen; picture-in-picture\" allowfullscreen></iframe>",
            quote_attr(&host.embed_url()),
            quote_attr(&width),
            quote_attr(&height)
        )),
        None => {
            let mut tag = format!(
                "<video src={} width={} controls",
                quote_attr(url),
                quote_attr(&width)
            );
            if node.flag("autoplay") {
                tag.push_str(" autoplay muted");
            }
            if node.flag("loop") {
                tag.push_str(" loop");
            }
            tag.push_str("></video>");
            lines.push(tag);
        }
    }
    if let Some(caption) = node.text_param("caption") {
        lines.push(format!("<p class=\"video-caption\">{}</p>", escape_html(caption)));
    }
    lines.push("```".to_string());
    lines
}

pub fn render_iframe(node: &Node) -> Vec<String> {
    let Some(src) = node.text_param("src").or_else(|| node.text_param("url")) else {
        tracing::warn!("iframe block without src");
        return Vec::new();
    };
    let height = size_text(node, "height").unwrap_or_else(|| "500px".to_string());
    let width = size_text(node, "width").unwrap_or_else(|| "100%".to_string());

    let mut tag = format!(
        "<iframe src={} width={} height={}",
        quote_attr(src),
        quote_attr(&width),
        quote_attr(&height)
    );
    if let Some(style) = node.text_param("style") {
        tag.push_str(&format!(" style={}", quote_attr(style)));
    }
    if let Some(title) = node.title() {
        tag.push_str(&format!(" title={}", quote_attr(title)));
    }
    tag.push_str(" frameborder=\"0\"></iframe>");

    vec!["```{=html}".to_string(), tag, "```".to_string()]
}
