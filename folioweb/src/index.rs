use maud::{html, Markup, DOCTYPE};

/// Shown in place of the frontend when its bundle has not been built.
pub fn placeholder_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Folio" }
            }
            body {
                h1 { "Folio is running" }
                p {
                    "The frontend has not been built. Build it into the directory given by "
                    code { "FRONTEND_DIR" }
                    " and reload this page."
                }
                p {
                    "The API is available under " code { "/api" } "."
                }
            }
        }
    }
}
