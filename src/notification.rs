const APP_NAME: &str = "codeshot";

/// Transient user-facing status messages.
pub trait Notifier {
    fn notify(&self, body: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, body: &str) {
        (**self).notify(body);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, body: &str) {
        send(body);
    }
}

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(APP_NAME)
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}
