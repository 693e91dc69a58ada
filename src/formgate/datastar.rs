//! Datastar server-sent events.
//!
//! Datastar reads an SSE stream where every event names an action
//! (`datastar-merge-fragments`, `datastar-execute-script`) and carries its
//! arguments as `data:` lines of the form `<key> <value>`. Multi-line HTML is
//! sent as one `fragments` line per source line.

use axum::response::{
    sse::{Event, Sse},
    IntoResponse, Response,
};
use futures_util::{stream, StreamExt};
use std::{convert::Infallible, time::Duration};

const MERGE_FRAGMENTS: &str = "datastar-merge-fragments";
const EXECUTE_SCRIPT: &str = "datastar-execute-script";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatastarEvent {
    /// Morph `fragments` into the DOM, matched by element id.
    MergeFragments {
        fragments: String,
        use_view_transition: bool,
    },
    /// Run `script` in the browser.
    ExecuteScript { script: String },
}

impl DatastarEvent {
    #[must_use]
    pub fn merge_fragments(fragments: impl Into<String>) -> Self {
        Self::MergeFragments {
            fragments: fragments.into(),
            use_view_transition: false,
        }
    }

    /// Ask the browser to animate the merge with the View Transitions API.
    #[must_use]
    pub fn with_view_transition(self) -> Self {
        match self {
            Self::MergeFragments { fragments, .. } => Self::MergeFragments {
                fragments,
                use_view_transition: true,
            },
            other => other,
        }
    }

    #[must_use]
    pub fn execute_script(script: impl Into<String>) -> Self {
        Self::ExecuteScript {
            script: script.into(),
        }
    }

    /// Client-side navigation to `location`.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let location = location.replace('\\', "\\\\").replace('\'', "\\'");
        Self::execute_script(format!(
            "setTimeout(() => window.location = '{location}')"
        ))
    }

    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::MergeFragments { .. } => MERGE_FRAGMENTS,
            Self::ExecuteScript { .. } => EXECUTE_SCRIPT,
        }
    }

    /// The `data:` payload lines, without the `data: ` prefix.
    #[must_use]
    pub fn data_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            Self::MergeFragments {
                fragments,
                use_view_transition,
            } => {
                if *use_view_transition {
                    lines.push("useViewTransition true".to_string());
                }
                lines.extend(prefixed_lines("fragments", fragments));
            }
            Self::ExecuteScript { script } => {
                lines.extend(prefixed_lines("script", script));
            }
        }
        lines
    }

    #[must_use]
    pub fn to_sse(&self) -> Event {
        Event::default()
            .event(self.event_type())
            .data(self.data_lines().join("\n"))
    }
}

// SSE fields cannot carry bare carriage returns. Blank edges from template
// block delimiters are dropped.
fn prefixed_lines<'a>(key: &'a str, value: &'a str) -> impl Iterator<Item = String> + 'a {
    value
        .trim()
        .lines()
        .map(move |line| format!("{key} {}", line.replace('\r', "")))
}

/// An ordered sequence of events, each optionally preceded by a pause.
///
/// Pauses are timer waits inside the response stream; the worker thread is
/// free to serve other requests while a client waits for the next event.
#[derive(Clone, Debug, Default)]
pub struct DatastarStream {
    steps: Vec<(Duration, DatastarEvent)>,
}

impl DatastarStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-event stream.
    #[must_use]
    pub fn once(event: DatastarEvent) -> Self {
        Self::new().event(event)
    }

    #[must_use]
    pub fn event(self, event: DatastarEvent) -> Self {
        self.event_after(Duration::ZERO, event)
    }

    #[must_use]
    pub fn event_after(mut self, delay: Duration, event: DatastarEvent) -> Self {
        self.steps.push((delay, event));
        self
    }

    pub fn events(&self) -> impl Iterator<Item = &DatastarEvent> {
        self.steps.iter().map(|(_, event)| event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntoResponse for DatastarStream {
    fn into_response(self) -> Response {
        let events = stream::iter(self.steps).then(|(delay, event)| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, Infallible>(event.to_sse())
        });

        Sse::new(events).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{body::to_bytes, http::header::CONTENT_TYPE};
    use std::time::Instant;

    async fn body_of(stream: DatastarStream) -> Result<(Response<()>, String)> {
        let response = stream.into_response();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await?;
        Ok((Response::from_parts(parts, ()), String::from_utf8(bytes.to_vec())?))
    }

    #[test]
    fn merge_fragments_splits_lines() {
        let event = DatastarEvent::merge_fragments("<div id=\"a\">\n  <p>hi</p>\r\n</div>");
        assert_eq!(
            event.data_lines(),
            vec![
                "fragments <div id=\"a\">".to_string(),
                "fragments   <p>hi</p>".to_string(),
                "fragments </div>".to_string(),
            ]
        );
    }

    #[test]
    fn merge_fragments_drops_blank_edges() {
        let event = DatastarEvent::merge_fragments("\n<p id=\"a\">hi</p>\n");
        assert_eq!(event.data_lines(), vec!["fragments <p id=\"a\">hi</p>".to_string()]);
    }

    #[test]
    fn view_transition_comes_first() {
        let event = DatastarEvent::merge_fragments("<p id=\"x\"></p>").with_view_transition();
        assert_eq!(
            event.data_lines().first().map(String::as_str),
            Some("useViewTransition true")
        );
    }

    #[test]
    fn redirect_is_a_script() {
        let event = DatastarEvent::redirect("/authenticated-route");
        assert_eq!(event.event_type(), EXECUTE_SCRIPT);
        assert_eq!(
            event.data_lines(),
            vec!["script setTimeout(() => window.location = '/authenticated-route')".to_string()]
        );
    }

    #[test]
    fn redirect_escapes_quotes() {
        let event = DatastarEvent::redirect("/it's");
        assert_eq!(
            event.data_lines(),
            vec!["script setTimeout(() => window.location = '/it\\'s')".to_string()]
        );
    }

    #[tokio::test]
    async fn stream_writes_events_in_order() -> Result<()> {
        let stream = DatastarStream::new()
            .event(DatastarEvent::merge_fragments("<p id=\"ok\">ok</p>").with_view_transition())
            .event(DatastarEvent::redirect("/next"));

        let (response, body) = body_of(stream).await?;

        assert_eq!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/event-stream")
        );
        assert_eq!(
            body,
            "event: datastar-merge-fragments\n\
             data: useViewTransition true\n\
             data: fragments <p id=\"ok\">ok</p>\n\n\
             event: datastar-execute-script\n\
             data: script setTimeout(() => window.location = '/next')\n\n"
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delays_are_timer_based() -> Result<()> {
        let stream = DatastarStream::once(DatastarEvent::merge_fragments("<p id=\"a\"></p>"))
            .event_after(Duration::from_secs(4), DatastarEvent::redirect("/next"));
        assert_eq!(stream.len(), 2);

        let started = Instant::now();
        let (_, body) = body_of(stream).await?;

        // With the clock paused tokio auto-advances through the sleep.
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(body.ends_with("data: script setTimeout(() => window.location = '/next')\n\n"));
        Ok(())
    }
}
