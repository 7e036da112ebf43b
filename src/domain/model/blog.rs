use super::{ContentModel, FieldSpec};

const BLOG_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title", "title").trimmed(255).required(),
    FieldSpec::text("excerpt", "excerpt"),
    FieldSpec::text("content", "content").required(),
    FieldSpec::url("coverImageUrl", "cover_image_url"),
];

/// Blog posts.
pub struct BlogModel;

impl ContentModel for BlogModel {
    fn resource_name(&self) -> &str {
        "Blog"
    }

    fn table_name(&self) -> &str {
        "blogs"
    }

    fn fields(&self) -> &[FieldSpec] {
        BLOG_FIELDS
    }

    fn get_create_table_sql(&self) -> &str {
        "CREATE TABLE IF NOT EXISTS blogs (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            excerpt TEXT,
            content TEXT NOT NULL,
            cover_image_url TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            published_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"
    }
}
