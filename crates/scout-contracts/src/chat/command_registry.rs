#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const RAW_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "text_model",
        action: "set_text_model",
    },
    CommandSpec {
        command: "image_model",
        action: "set_image_model",
    },
];

/// Commands that switch mode and, when followed by text, submit it as a query.
pub(crate) const MODE_COMMANDS: &[(&str, &str)] = &[
    ("web", "web"),
    ("search", "web"),
    ("images", "web_image"),
    ("image_search", "web_image"),
    ("generate", "image_generation"),
    ("gen", "image_generation"),
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[CommandSpec {
    command: "save",
    action: "save_images",
}];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
    CommandSpec {
        command: "exit",
        action: "quit",
    },
];

pub(crate) const SET_MODE_COMMAND: CommandSpec = CommandSpec {
    command: "mode",
    action: "set_mode",
};

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/web",
    "/images",
    "/generate",
    "/mode",
    "/text_model",
    "/image_model",
    "/save",
    "/status",
    "/help",
    "/quit",
];
