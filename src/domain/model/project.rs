use super::{ContentModel, FieldSpec};

const PROJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title", "title").trimmed(255).required(),
    FieldSpec::text("excerpt", "excerpt"),
    FieldSpec::text("content", "content").required(),
    FieldSpec::url("coverImageUrl", "cover_image_url"),
    FieldSpec::text("abstract", "abstract"),
    FieldSpec::text("projectScope", "project_scope"),
    FieldSpec::boolean("isGroup", "is_group"),
    FieldSpec::url("projectLink", "project_link"),
    FieldSpec::url("githubLink", "github_link"),
    FieldSpec::url("documentationLink", "documentation_link"),
];

/// Portfolio projects. Same lifecycle as blogs, with extra descriptive links.
pub struct ProjectModel;

impl ContentModel for ProjectModel {
    fn resource_name(&self) -> &str {
        "Project"
    }

    fn table_name(&self) -> &str {
        "projects"
    }

    fn fields(&self) -> &[FieldSpec] {
        PROJECT_FIELDS
    }

    fn get_create_table_sql(&self) -> &str {
        "CREATE TABLE IF NOT EXISTS projects (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            excerpt TEXT,
            content TEXT NOT NULL,
            cover_image_url TEXT,
            \"abstract\" TEXT,
            project_scope TEXT,
            is_group BOOLEAN NOT NULL DEFAULT FALSE,
            project_link TEXT,
            github_link TEXT,
            documentation_link TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            published_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"
    }
}
