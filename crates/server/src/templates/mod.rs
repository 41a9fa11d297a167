use maud::{html, Markup, DOCTYPE};

/// Landing page listing the available routes.
///
/// The two parameterized routes are listed with literal `<start>` / `<end>`
/// placeholders; callers substitute real dates.
pub fn home_page(remote_url: &str) -> Markup {
    let api_routes = [
        "api/v1.0/precipitation",
        "api/v1.0/stations",
        "api/v1.0/tobs",
        "api/v1.0/<start>",
        "api/v1.0/<start>/<end>",
    ];

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Climate Archive" }
            }
            body {
                h1 { "Available Routes:" }
                ul {
                    @for route in &api_routes {
                        li {
                            a href=(format!("{}/{}", remote_url, route)) { (route) }
                        }
                    }
                }
                p {
                    a href=(format!("{}/docs", remote_url)) { "API documentation" }
                }
            }
        }
    }
}
