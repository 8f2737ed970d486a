//! Toast sink port - where user-facing feedback goes

use crate::domain::Toast;

pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}
