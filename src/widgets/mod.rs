pub(crate) mod button_group;
pub(crate) mod dialog;
pub(crate) mod label;
pub(crate) mod poster;
