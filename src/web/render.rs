use crate::web::catalog::VideoEntry;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const SECTION_TITLES: [&str; 6] = [
    "Who is the subject",
    "What they built",
    "Main strategy",
    "Playbook",
    "Tech stack",
    "Advice",
];

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
a{color:#2457c5}.video{border-bottom:1px solid #ddd;padding:1rem 0}.date{color:#666;font-size:.9rem}\
.transcript{white-space:pre-wrap;background:#f6f6f6;padding:1rem;border-radius:4px}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        encode_text(title)
    )
}

fn detail_href(id: &str) -> String {
    format!("/transcript/{}", encode_double_quoted_attribute(id))
}

pub fn index_page(videos: &[VideoEntry]) -> String {
    let mut body = String::from("<h1>Video summaries</h1>\n");

    if videos.is_empty() {
        body.push_str("<p>No videos fetched yet.</p>\n");
    }

    for video in videos {
        let _ = write!(
            body,
            "<div class=\"video\">\n<h2><a href=\"{}\">{}</a></h2>\n<div class=\"date\">{}</div>\n\
             <div class=\"subject\">{}</div>\n<div class=\"strategy\">{}</div>\n</div>\n",
            detail_href(&video.id),
            encode_text(&video.title),
            encode_text(&video.date),
            video.summary.subject,
            video.summary.strategy,
        );
    }

    page("Video summaries", &body)
}

pub fn detail_page(video: &VideoEntry) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<p><a href=\"/\">&larr; All videos</a></p>\n<h1>{}</h1>\n<div class=\"date\">{}</div>\n",
        encode_text(&video.title),
        encode_text(&video.date),
    );

    for ((key, html), heading) in video.summary.sections().into_iter().zip(SECTION_TITLES) {
        let _ = write!(
            body,
            "<section class=\"{key}\">\n<h2>{heading}</h2>\n{html}\n</section>\n"
        );
    }

    let _ = write!(
        body,
        "<h2>Transcript</h2>\n<div class=\"transcript\">{}</div>\n",
        encode_text(&video.transcript)
    );

    page(&video.title, &body)
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        "<h1>Not found</h1>\n<p>No video with that identifier.</p>\n<p><a href=\"/\">All videos</a></p>\n",
    )
}
