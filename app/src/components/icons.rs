use leptos::{
    html::{a, div, span},
    prelude::*,
};

/// Where the site can be followed, rendered in the footer.
const SOCIAL_LINKS: [(&str, &str, &str); 3] = [
    ("https://twitter.com/mozdevnet", "Twitter", "𝕏"),
    ("https://github.com/mdn/", "GitHub", "GH"),
    ("https://hacks.mozilla.org/feed/", "RSS", "RSS"),
];

pub fn component() -> impl IntoView {
    div().class("flex flex-row gap-3 items-center social").child(
        SOCIAL_LINKS
            .iter()
            .map(|(href, label, glyph)| {
                a().href(*href)
                    .rel("noopener noreferrer")
                    .target("_blank")
                    .aria_label(*label)
                    .class("social-link")
                    .child(span().child(*glyph))
            })
            .collect_view(),
    )
}
