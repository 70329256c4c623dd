//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML compilados com o macro [`maud`](https://maud.lambda.xyz/).
//! O servidor devolve **HTML fragments**; o HTMX os injeta no DOM e o
//! `EventSource` da página recebe as respostas do assistente via SSE.
//!
//! ## Templates Disponíveis
//!
//! | Função | Tipo | Descrição |
//! |--------|------|-----------|
//! | [`chat_page()`] | Página completa | Widget de chat com boas-vindas e perguntas rápidas |
//! | [`message_bubble()`] | Fragment | Uma mensagem (usuário ou assistente) |
//! | [`typing_indicator()`] | Fragment | Os três pontinhos enquanto o assistente "digita" |
//! | [`quick_questions()`] | Fragment | Botões de perguntas rápidas |
//! | [`admin_login_page()`] | Página completa | Formulário de login do painel |
//!
//! ## Layout do Widget
//!
//! ```text
//! ┌──────── Moshi Moshi Nippon Assistant ────────┐
//! │ ┌──────────────────────────┐                 │
//! │ │ Hello! I'm your ...      │ 10:02           │
//! │ └──────────────────────────┘                 │
//! │                 ┌──────────────────────────┐ │
//! │          10:03  │ How much does it cost?   │ │
//! │                 └──────────────────────────┘ │
//! │ • • •                                        │
//! ├──────────────────────────────────────────────┤
//! │ [Business visa requirements] [Student ...]   │
//! │ [_____________________________________][➤]   │
//! └──────────────────────────────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};
use uuid::Uuid;

use crate::chat::{ConversationMessage, Sender, QUICK_QUESTIONS};

fn head(title: &str) -> Markup {
    html! {
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            title { (title) }
            link rel="stylesheet" href="/assets/style.css";
            script src="https://unpkg.com/htmx.org@2.0.4" {}
        }
    }
}

/// Uma mensagem do chat.
///
/// O texto vai escapado; quebras de linha são preservadas pelo CSS
/// (`white-space: pre-line`).
pub fn message_bubble(message: &ConversationMessage) -> Markup {
    let class = match message.sender {
        Sender::User => "message user-message",
        Sender::Bot => "message bot-message",
    };
    html! {
        div class=(class) data-id=(message.id.to_string()) {
            div class="message-content" { (message.text) }
            div class="message-time" { (message.time_label()) }
        }
    }
}

/// Indicador de digitação, removido pelo script quando chega o `BotMessage`.
pub fn typing_indicator() -> Markup {
    html! {
        div class="message bot-message typing" {
            span class="dot" {}
            span class="dot" {}
            span class="dot" {}
        }
    }
}

/// Botões de perguntas rápidas; cada um envia o próprio texto.
pub fn quick_questions() -> Markup {
    html! {
        div id="quick-questions" class="quick-questions" {
            @for question in QUICK_QUESTIONS {
                button type="button" class="quick-question"
                    onclick="sendQuick(this.textContent)" { (question) }
            }
        }
    }
}

/// Página do widget de chat.
///
/// `messages` é o histórico atual da sessão (normalmente só as
/// boas-vindas). O script inline assina `/chat/{id}/events` e:
/// - ignora `UserMessage` e `Typing` (já vieram no fragmento HTMX)
/// - em `BotMessage`, troca o primeiro indicador de digitação pela resposta
///   e esconde as perguntas rápidas
pub fn chat_page(session_id: Uuid, messages: &[ConversationMessage], show_quick: bool) -> Markup {
    let post_url = format!("/chat/{}", session_id);
    let events_url = format!("/chat/{}/events", session_id);
    let reset_url = format!("/chat/{}/reset", session_id);
    html! {
        (DOCTYPE)
        html lang="en" {
            (head("Moshi Moshi Nippon — Assistant"))
            body {
                div class="chat-widget" data-events=(events_url) {
                    div class="chat-header" {
                        span class="chat-title" { "Moshi Moshi Nippon Assistant" }
                        span class="chat-subtitle" { "Japan visa & travel help" }
                        button class="chat-reset" type="button"
                            hx-post=(reset_url)
                            hx-target="#chat-messages"
                            hx-swap="innerHTML" { "Clear" }
                    }

                    div id="chat-messages" class="chat-messages" {
                        @for message in messages {
                            (message_bubble(message))
                        }
                    }

                    @if show_quick {
                        (quick_questions())
                    }

                    form id="chat-form" class="chat-input-area"
                        hx-post=(post_url)
                        hx-target="#chat-messages"
                        hx-swap="beforeend" {
                        input type="text" name="message"
                            placeholder="Type your message..."
                            autocomplete="off"
                            autofocus;
                        button type="submit" { "Send" }
                    }
                }

                (PreEscaped(r#"<script>
function sendQuick(text) {
    const form = document.getElementById('chat-form');
    form.querySelector('input[name=message]').value = text;
    form.requestSubmit();
}

(function () {
    const widget = document.querySelector('.chat-widget');
    const list = document.getElementById('chat-messages');
    const scroll = () => { list.scrollTop = list.scrollHeight; };
    new MutationObserver(scroll).observe(list, { childList: true });
    scroll();
    document.getElementById('chat-form')
        .addEventListener('htmx:afterRequest', (e) => e.target.reset());

    const source = new EventSource(widget.dataset.events);
    source.onmessage = (e) => {
        const event = JSON.parse(e.data);
        if (event.type !== 'BotMessage') return;

        const typing = list.querySelector('.typing');
        if (typing) typing.remove();

        const msg = event.message;
        const bubble = document.createElement('div');
        bubble.className = 'message bot-message';
        bubble.dataset.id = msg.id;
        const content = document.createElement('div');
        content.className = 'message-content';
        content.textContent = msg.text;
        const time = document.createElement('div');
        time.className = 'message-time';
        time.textContent = new Date(msg.timestamp)
            .toISOString().substring(11, 16);
        bubble.append(content, time);
        list.appendChild(bubble);

        const quick = document.getElementById('quick-questions');
        if (quick) quick.remove();
    };
})();
</script>"#))
            }
        }
    }
}

/// Página de login do painel administrativo.
///
/// O POST volta como fragmento em `#login-result`; erros 401 são
/// exibidos pelo handler `htmx:responseError`.
pub fn admin_login_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head("Admin Login — Moshi Moshi Nippon"))
            body {
                div class="login-card" {
                    h1 { "Admin Login" }
                    form hx-post="/admin/login" hx-target="#login-result" hx-swap="innerHTML" {
                        label { "Email" input type="email" name="email" required; }
                        label { "Password" input type="password" name="password" required; }
                        button type="submit" { "Sign in" }
                    }
                    div id="login-result" {}
                }
                (PreEscaped(r#"<script>
document.body.addEventListener('htmx:responseError', (e) => {
    document.getElementById('login-result').textContent =
        e.detail.xhr.status === 401 ? 'Invalid email or password' : 'Login failed';
});
</script>"#))
            }
        }
    }
}

/// Fragmento exibido após login bem-sucedido.
pub fn admin_signed_in(subject: &str, expires_at: &str) -> Markup {
    html! {
        p class="login-ok" {
            "Signed in as " strong { (subject) } ". Session valid until " (expires_at) "."
        }
        form method="post" action="/admin/logout" {
            button type="submit" { "Sign out" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubble_escapes_text() {
        let msg = ConversationMessage::new("<b>hi</b>", Sender::User);
        let html = message_bubble(&msg).into_string();
        assert!(html.contains("user-message"));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[test]
    fn page_lists_quick_questions_only_when_asked() {
        let id = Uuid::new_v4();
        let with = chat_page(id, &[], true).into_string();
        for question in QUICK_QUESTIONS {
            assert!(with.contains(question));
        }
        assert!(with.contains(&format!("/chat/{}/events", id)));

        let without = chat_page(id, &[], false).into_string();
        assert!(!without.contains("quick-question\""));
    }
}
