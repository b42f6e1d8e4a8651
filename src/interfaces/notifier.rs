/// User facing messages, fire and forget.
pub trait NotifierInterface {
    fn notify_error(&self, message: &str);
}
