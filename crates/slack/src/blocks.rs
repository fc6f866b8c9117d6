use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { block_id: String, text: TextObject },
    Context { block_id: String, elements: Vec<TextObject> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section(mut self, block_id: impl Into<String>, text: TextObject) -> Self {
        self.blocks.push(Block::Section { block_id: block_id.into(), text });
        self
    }

    pub fn context(mut self, block_id: impl Into<String>, elements: Vec<TextObject>) -> Self {
        self.blocks.push(Block::Context { block_id: block_id.into(), elements });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

/// The `/okr` usage message, sent whenever the command text does not
/// parse. One section per supported command, each with an example.
pub fn help_message() -> MessageTemplate {
    let commands: [(&str, &str, &str); 8] = [
        (
            "subscribe-organization",
            "Subscribe to notifications for an organization\n`/okr subscribe organization organization-slug`",
            "/okr subscribe organization oslo-origo",
        ),
        (
            "unsubscribe-organization",
            "Unsubscribe from notifications for an organization\n`/okr unsubscribe organization organization-slug`",
            "/okr unsubscribe organization oslo-origo",
        ),
        (
            "subscribe-department",
            "Subscribe to notifications for a department\n`/okr subscribe department department-slug`",
            "/okr subscribe department apen-by",
        ),
        (
            "unsubscribe-department",
            "Unsubscribe from notifications for a department\n`/okr unsubscribe department department-slug`",
            "/okr unsubscribe department apen-by",
        ),
        (
            "subscribe-product",
            "Subscribe to notifications for a product\n`/okr subscribe product product-slug`",
            "/okr subscribe product oslonokkelen",
        ),
        (
            "unsubscribe-product",
            "Unsubscribe from notifications for a product\n`/okr unsubscribe product product-slug`",
            "/okr unsubscribe product oslonokkelen",
        ),
        (
            "subscribe-all",
            "Subscribe to an organization or department and everything under it\n`/okr subscribe/all {organization|department} slug`",
            "/okr subscribe/all organization oslo-origo",
        ),
        (
            "unsubscribe-all",
            "Unwind a cascading subscription\n`/okr unsubscribe/all {organization|department} slug`",
            "/okr unsubscribe/all organization oslo-origo",
        ),
    ];

    let mut builder = MessageBuilder::new("Need some help with /okr?")
        .section(
            "help-intro",
            TextObject::mrkdwn("Invalid command! :wave: Need some help with `/okr`?"),
        )
        .section(
            "help-slug",
            TextObject::mrkdwn(
                "Slug is the lowercase name your organization/department/product gets and is \
                 used in the url. I.E: https://okr.oslo.systems/oslo-origo. The slug here is \
                 `oslo-origo`",
            ),
        );

    for (id, description, example) in commands {
        builder = builder.section(
            format!("help-{id}"),
            TextObject::mrkdwn(format!("{description}\nExample: `{example}`")),
        );
    }

    builder.build()
}
