pub trait AuthInterface {
    /// `None` while nobody is signed in.
    fn current_user_id(&self) -> Option<String>;
}
