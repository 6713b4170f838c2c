use guide_core::model::{
    Article, ArticleId, Catalog, Category, CategoryId, QuestionId, QuestionKind, Quiz, QuizAnswer,
    QuizQuestion, SubmittedAnswer, Topic, TopicId,
};
use guide_core::time::fixed_now;
use services::{AppServices, Clock};
use storage::content::ContentStore;
use storage::repository::Storage;

fn quiz(points: &[u32]) -> Quiz {
    Quiz {
        total_points: Some(points.iter().sum()),
        questions: points
            .iter()
            .enumerate()
            .map(|(i, p)| QuizQuestion {
                id: QuestionId::new(format!("q{i}")).unwrap(),
                kind: QuestionKind::MultipleChoice,
                points: *p,
                question: format!("Question {i}"),
                options: vec!["yes".into(), "no".into()],
                correct_answer: Some(0),
                additional_context: None,
                key_concepts: Vec::new(),
            })
            .collect(),
    }
}

fn article(id: &str) -> Article {
    let mut article = Article::stub(ArticleId::new(id).unwrap(), id);
    article.quiz = Some(quiz(&[1]));
    article
}

fn write_catalog(dir: &std::path::Path) {
    let catalog = Catalog::new(vec![Category {
        id: CategoryId::new("backend").unwrap(),
        name: "Backend".into(),
        topics: vec![
            Topic {
                id: TopicId::new("topic-a").unwrap(),
                name: "A".into(),
                articles: vec![article("a1"), article("a2")],
            },
            Topic {
                id: TopicId::new("topic-b").unwrap(),
                name: "B".into(),
                articles: vec![article("b1")],
            },
        ],
    }]);
    ContentStore::new(dir).save_catalog(&catalog).unwrap();
}

fn correct() -> Vec<SubmittedAnswer> {
    vec![SubmittedAnswer {
        question_id: QuestionId::new("q0").unwrap(),
        answer: QuizAnswer::choice(0),
    }]
}

#[tokio::test]
async fn category_proficiency_pools_articles_across_topics() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let storage = Storage::sqlite("sqlite:file:memdb_progress_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let app = AppServices::with_storage(dir.path(), storage, Clock::fixed(fixed_now()))
        .expect("app services");
    let progress = app.progress();

    for id in ["a1", "a2"] {
        progress
            .submit_quiz(&ArticleId::new(id).unwrap(), &correct())
            .await
            .unwrap();
    }
    progress
        .submit_quiz(&ArticleId::new("b1").unwrap(), &[])
        .await
        .unwrap();

    let category = CategoryId::new("backend").unwrap();
    assert_eq!(
        progress.category_proficiency(&category).await.unwrap().value(),
        66
    );
    assert_eq!(
        progress
            .topic_proficiency(&TopicId::new("topic-b").unwrap())
            .await
            .unwrap()
            .value(),
        0
    );

    let report = progress.report().await.unwrap();
    assert_eq!(report.categories[0].proficiency.value(), 66);
    assert_eq!(report.categories[0].topics[0].proficiency.value(), 100);
}
