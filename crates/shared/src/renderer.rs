use std::fmt;
use std::str::FromStr;

use crate::models::{Digest, ScoredPost};

/// Built-in page styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    NoStyle,
}

impl Theme {
    const ALL: [Theme; 2] = [Theme::Default, Theme::NoStyle];

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.name()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::NoStyle => "no-style",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name.trim())
    }

    fn stylesheet(self) -> &'static str {
        match self {
            Theme::Default => concat!(
                "    body { font-family: Arial, sans-serif; max-width: 800px; margin: 40px auto; padding: 0 20px; line-height: 1.6; background-color: #f5f6fa; }\n",
                "    h1 { color: #2c3e50; border-bottom: 3px solid #6364ff; padding-bottom: 10px; text-align: center; }\n",
                "    h1 .subtitle { display: block; font-size: 0.6em; font-weight: normal; color: #555; }\n",
                "    h2 { color: #34495e; padding: 10px; background-color: #ecf0f1; border-left: 4px solid #6364ff; }\n",
                "    .post { margin: 15px 0; padding: 15px; background-color: #fff; border-radius: 6px; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }\n",
                "    .author { font-weight: bold; color: #2c3e50; }\n",
                "    .handle { color: #7f8c8d; font-size: 0.9em; }\n",
                "    .metadata { color: #7f8c8d; font-size: 0.85em; margin-top: 8px; }\n",
                "    .metadata a { color: #6364ff; text-decoration: none; margin-right: 12px; }\n",
                "    .metadata a:hover { text-decoration: underline; }\n",
                "    .score { cursor: help; border-bottom: 1px dotted #7f8c8d; }\n",
                "    .empty { color: #7f8c8d; font-style: italic; }\n",
                "    footer { text-align: center; color: #95a5a6; font-size: 0.8em; margin-top: 40px; }\n",
            ),
            Theme::NoStyle => "",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            anyhow::anyhow!("Unknown theme: {}. Use one of: {}", s, Self::names().join(", "))
        })
    }
}

pub struct DigestRenderer;

impl DigestRenderer {
    /// A standalone HTML page for `digest`.
    pub fn render(digest: &Digest, theme: Theme) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "  <title>Mastodon Digest - {}</title>\n",
            Self::escape_html(&digest.timeline_name)
        ));
        let stylesheet = theme.stylesheet();
        if !stylesheet.is_empty() {
            html.push_str("  <style>\n");
            html.push_str(stylesheet);
            html.push_str("  </style>\n");
        }
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>Mastodon Digest<span class=\"subtitle\">The {} timeline over the past {} hours</span></h1>\n",
            Self::escape_html(&digest.timeline_name),
            digest.hours
        ));

        html.push_str(&Self::render_fragment(digest));

        html.push_str(&format!(
            "<footer>Scored with {} at the {} threshold. Rendered {}.</footer>\n",
            Self::escape_html(digest.scorer),
            Self::escape_html(digest.threshold),
            Self::escape_html(&digest.rendered_at)
        ));

        html.push_str("</body>\n</html>");
        html
    }

    /// Just the posts and boosts sections, for embedding.
    pub fn render_fragment(digest: &Digest) -> String {
        let mut html = String::new();
        Self::push_section(&mut html, "Posts", &digest.posts, &digest.mastodon_base_url);
        Self::push_section(&mut html, "Boosts", &digest.boosts, &digest.mastodon_base_url);
        html
    }

    fn push_section(html: &mut String, title: &str, posts: &[ScoredPost], base_url: &str) {
        html.push_str(&format!("<section>\n  <h2>{}</h2>\n", title));

        if posts.is_empty() {
            html.push_str(&format!(
                "  <p class=\"empty\">No {} met the threshold.</p>\n",
                title.to_lowercase()
            ));
        }

        for post in posts {
            let account = &post.info.account;
            let author = if account.display_name.is_empty() {
                &account.acct
            } else {
                &account.display_name
            };

            html.push_str("  <article class=\"post\">\n");
            html.push_str(&format!(
                "    <div><span class=\"author\">{}</span> <span class=\"handle\">@{}</span></div>\n",
                Self::escape_html(author),
                Self::escape_html(&account.acct)
            ));
            // Status content is HTML sanitized by the Mastodon server.
            html.push_str(&format!(
                "    <div class=\"content\">{}</div>\n",
                post.info.content
            ));
            html.push_str("    <div class=\"metadata\">\n");
            html.push_str(&format!(
                "      <a href=\"{}\" target=\"_blank\">Original</a>\n",
                Self::escape_html(post.url())
            ));
            html.push_str(&format!(
                "      <a href=\"{}\" target=\"_blank\">Home</a>\n",
                Self::escape_html(&post.home_url(base_url))
            ));
            html.push_str(&format!(
                "      <span class=\"score\" title=\"{}\">Score: {:.2}</span>\n",
                Self::escape_html(&post.breakdown_string()),
                post.score()
            ));
            html.push_str("    </div>\n");
            html.push_str("  </article>\n");
        }

        html.push_str("</section>\n");
    }

    /// The server's landing page: three feed configurations side by side.
    ///
    /// The two preset columns load as soon as the page opens; the last one
    /// waits for the reader to submit their own weights.
    pub fn comparison_page() -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str("  <title>Mastodon Digest - Compare Feeds</title>\n");
        html.push_str("  <style>\n");
        html.push_str(Theme::Default.stylesheet());
        html.push_str("    body { max-width: 1400px; }\n");
        html.push_str("    .columns { display: flex; gap: 20px; }\n");
        html.push_str("    .column { flex: 1; min-width: 0; }\n");
        html.push_str("    form label { display: block; margin: 4px 0; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");
        html.push_str("<h1>Mastodon Digest<span class=\"subtitle\">Compare feed configurations</span></h1>\n");
        html.push_str("<div class=\"columns\">\n");

        for (index, preset) in COMPARISON_PRESETS.iter().enumerate() {
            let (favourites, reblogs, replies, boost) = preset.weights;
            html.push_str("  <div class=\"column\">\n");
            html.push_str(&format!(
                "    <form class=\"feed-form\" data-target=\"feed-{}\" data-autoload=\"{}\">\n",
                index, preset.autoload
            ));
            html.push_str("      <label>Hours <input name=\"hours\" type=\"number\" min=\"1\" max=\"24\" value=\"12\"></label>\n");
            for (name, value) in [
                ("favourites_weight", favourites),
                ("reblogs_weight", reblogs),
                ("replies_weight", replies),
            ] {
                html.push_str(&format!(
                    "      <label>{} <input name=\"{}\" type=\"number\" min=\"0\" max=\"2\" step=\"0.1\" value=\"{}\"></label>\n",
                    name, name, value
                ));
            }
            html.push_str(&format!(
                "      <label>Inverse follower boost <input name=\"inverse_follower_boost\" type=\"checkbox\" value=\"1\"{}></label>\n",
                if boost { " checked" } else { "" }
            ));
            html.push_str("      <label>Threshold <select name=\"threshold\"><option>lax</option><option selected>normal</option><option>strict</option></select></label>\n");
            html.push_str("      <label>Timeline <input name=\"timeline\" value=\"home\"></label>\n");
            html.push_str("      <button type=\"submit\">Generate</button>\n");
            html.push_str("    </form>\n");
            html.push_str(&format!("    <div id=\"feed-{}\"></div>\n", index));
            html.push_str("  </div>\n");
        }

        html.push_str("</div>\n");
        html.push_str(COMPARISON_SCRIPT);
        html.push_str("</body>\n</html>");
        html
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

struct ComparisonPreset {
    /// Favourites, reblogs and replies weights, then the inverse follower boost.
    weights: (&'static str, &'static str, &'static str, bool),
    autoload: bool,
}

const COMPARISON_PRESETS: [ComparisonPreset; 3] = [
    ComparisonPreset {
        weights: ("1", "1", "1", false),
        autoload: true,
    },
    ComparisonPreset {
        weights: ("1", "0", "1", true),
        autoload: true,
    },
    ComparisonPreset {
        weights: ("0", "0", "0", false),
        autoload: false,
    },
];

const COMPARISON_SCRIPT: &str = r#"<script>
function generateFeed(form) {
  var data = new FormData(form);
  var body = {
    hours: Number(data.get('hours')),
    favourites_weight: Number(data.get('favourites_weight')),
    reblogs_weight: Number(data.get('reblogs_weight')),
    replies_weight: Number(data.get('replies_weight')),
    inverse_follower_boost: data.get('inverse_follower_boost') === '1',
    threshold: data.get('threshold'),
    timeline: data.get('timeline')
  };
  var target = document.getElementById(form.dataset.target);
  target.innerHTML = '<p class="empty">Loading...</p>';
  fetch('/feed/generate', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body)
  }).then(function (response) {
    return response.text();
  }).then(function (html) {
    target.innerHTML = html || '<p class="empty">Nothing met the threshold.</p>';
  });
}

document.querySelectorAll('.feed-form').forEach(function (form) {
  form.addEventListener('submit', function (event) {
    event.preventDefault();
    generateFeed(form);
  });
  if (form.dataset.autoload === 'true') {
    generateFeed(form);
  }
});
</script>
"#;
