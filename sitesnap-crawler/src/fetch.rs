use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the static selector-inference path (login pages that are
/// server-rendered don't need a browser).
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent("sitesnap/0.2 (https://github.com/trapdoorsec/sitesnap)")
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching {}", url);
    let response = client.get(url).send().await?;
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::detect_login_form;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_page_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><body>hello</body></html>"),
            )
            .mount(&mock_server)
            .await;

        let client = build_client(5).unwrap();
        let html = fetch_html(&client, &format!("{}/login", mock_server.uri()))
            .await
            .unwrap();
        assert!(html.contains("hello"));
    }

    #[tokio::test]
    async fn static_fetch_feeds_login_detection() {
        let mock_server = MockServer::start().await;
        let login_html = r#"
            <form action="/session" method="post">
                <input type="text" id="userid" />
                <input type="password" id="passwd" />
                <button class="btn-login">로그인</button>
            </form>
        "#;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(login_html),
            )
            .mount(&mock_server)
            .await;

        let client = build_client(5).unwrap();
        let html = fetch_html(&client, &format!("{}/login", mock_server.uri()))
            .await
            .unwrap();
        let found = detect_login_form(&html);
        assert_eq!(found.id_selector, "#userid");
        assert_eq!(found.pw_selector, "#passwd");
        assert_eq!(found.btn_selector, "button.btn-login");
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let client = build_client(1).unwrap();
        // Nothing listens on this port.
        let result = fetch_html(&client, "http://127.0.0.1:9/none").await;
        assert!(result.is_err());
    }
}
