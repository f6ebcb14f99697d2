use head::{
    AttrList, Element, HeadConfig, HeadContext, PropBag, RenderScope, TagDescriptor,
    render_to_context,
};

fn main() {
    env_logger::init();

    let mut context = HeadContext::new();
    let body = render_to_context(HeadConfig::default(), &mut context, |scope| {
        layout(scope, |scope| article(scope, "Ownership & borrowing, briefly"))
    });
    let head = context.head_or_fallback();

    let html_attributes = head.html_attributes.to_string();
    let body_attributes = head.body_attributes.to_string();
    println!(
        "<!DOCTYPE html>\n<html{}>\n<head>\n{}\n</head>\n<body{}>\n{}\n</body>\n</html>",
        leading_space(&html_attributes),
        head.head_markup(),
        leading_space(&body_attributes),
        body
    );
}

fn leading_space(attributes: &str) -> String {
    if attributes.is_empty() {
        String::new()
    } else {
        format!(" {attributes}")
    }
}

fn layout(scope: &mut RenderScope, page: impl FnOnce(&mut RenderScope) -> String) -> String {
    scope.contribute(
        PropBag::new()
            .title_template("%s | Field Notes")
            .default_title("Field Notes")
            .html_attributes(AttrList::new().with("lang", "en"))
            .meta(TagDescriptor::new().attr("charset", "utf-8"))
            .meta(
                TagDescriptor::new()
                    .attr("name", "description")
                    .attr("content", "Notes from the field"),
            )
            .link(TagDescriptor::new().attr("rel", "stylesheet").attr("href", "/site.css")),
    );
    let content = page(scope);
    format!("<main>{content}</main>")
}

fn article(scope: &mut RenderScope, title: &str) -> String {
    let children = [
        Element::new("title").text(title),
        Element::new("meta")
            .attr("name", "description")
            .attr("content", format!("{title}: a short read")),
        Element::new("link")
            .attr("rel", "canonical")
            .attr("href", "https://notes.example/ownership"),
        Element::new("body").attr("className", "article"),
    ];
    if let Err(err) = scope.contribute_children(&children) {
        log::warn!("article head ignored: {err}");
    }
    format!("<article><h1>{}</h1></article>", html::escape::escape(title))
}
