// Minimal inline HTML for the login page and the post-login welcome
use crate::oauth::UserInfo;
use crate::utils::markup::escape;

/// Sign-in page that hands Google's one-time code to `POST /gconnect`
#[must_use]
pub fn login_page(state: &str, client_id: &str) -> String {
    let connect_url = format!("/gconnect?state={}", urlencoding::encode(state));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Item Catalog - Sign In</title>
    <script src="https://accounts.google.com/gsi/client" async defer></script>
</head>
<body>
    <h1>Sign in to Item Catalog</h1>
    <button id="signinButton" data-client-id="{client_id}" data-connect-url="{connect_url}">Sign in with Google</button>
    <div id="result"></div>
    <script>
        document.getElementById('signinButton').addEventListener('click', function () {{
            var button = this;
            var client = google.accounts.oauth2.initCodeClient({{
                client_id: button.dataset.clientId,
                scope: 'openid email profile',
                ux_mode: 'popup',
                callback: function (authResult) {{
                    if (!authResult.code) {{
                        document.getElementById('result').textContent = 'Sign-in was cancelled.';
                        return;
                    }}
                    fetch(button.dataset.connectUrl, {{
                        method: 'POST',
                        headers: {{ 'Content-Type': 'application/octet-stream; charset=utf-8' }},
                        body: authResult.code
                    }})
                        .then(function (response) {{ return response.text(); }})
                        .then(function (html) {{
                            document.getElementById('result').innerHTML = html;
                            setTimeout(function () {{ window.location.href = '/'; }}, 4000);
                        }});
                }}
            }});
            client.requestCode();
        }});
    </script>
</body>
</html>"#,
        client_id = escape(client_id),
        connect_url = escape(&connect_url),
    )
}

/// Confirmation shown after a successful connect
#[must_use]
pub fn welcome_page(user: &UserInfo) -> String {
    format!(
        r#"<h1>Welcome, {}!</h1><img src="{}" style="width: 300px; height: 300px; border-radius: 150px;">"#,
        escape(&user.name),
        escape(&user.picture),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_embeds_state_and_client() {
        let page = login_page("ABC123", "client-x");
        assert!(page.contains(r#"data-client-id="client-x""#));
        assert!(page.contains(r#"data-connect-url="/gconnect?state=ABC123""#));
    }

    #[test]
    fn test_welcome_page_escapes_profile() {
        let page = welcome_page(&UserInfo {
            name: "<Jane>".to_string(),
            picture: "https://example.com/a.png".to_string(),
            email: String::new(),
        });
        assert!(page.starts_with("<h1>Welcome, &lt;Jane&gt;!</h1>"));
        assert!(page.contains(r#"src="https://example.com/a.png""#));
    }
}
